//! JSON response envelopes shared by the HTTP API and its clients.
//!
//! Mutation and lookup endpoints answer with [`Envelope`]; listing endpoints
//! answer with [`ListEnvelope`]. Failures use [`ErrorBody`].

use serde::{Deserialize, Serialize};

use crate::query::{Page, Pagination};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
  pub success: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub data:    Option<T>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
}

impl<T> Envelope<T> {
  pub fn data(data: T) -> Self {
    Self { success: true, data: Some(data), message: None }
  }
}

impl Envelope<()> {
  pub fn message(message: impl Into<String>) -> Self {
    Self { success: true, data: None, message: Some(message.into()) }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListEnvelope<T> {
  pub success:    bool,
  pub data:       Vec<T>,
  pub pagination: Pagination,
}

impl<T> From<Page<T>> for ListEnvelope<T> {
  fn from(page: Page<T>) -> Self {
    Self { success: true, data: page.items, pagination: page.pagination }
  }
}

impl<T> From<ListEnvelope<T>> for Page<T> {
  fn from(envelope: ListEnvelope<T>) -> Self {
    Self { items: envelope.data, pagination: envelope.pagination }
  }
}

/// Body of `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
  pub status:  String,
  pub version: String,
}

/// Result of `POST /wards/redistribute-workers`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Redistribution {
  pub workers_reassigned: u64,
}

/// One rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
  pub field:   String,
  pub message: String,
}

impl FieldError {
  pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
    Self { field: field.into(), message: message.into() }
  }
}

/// Body of every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
  pub success: bool,
  pub error:   String,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub details: Vec<FieldError>,
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{query::PageRequest, ward::Ward};

  #[test]
  fn listing_envelope_uses_snake_case_pagination() {
    let page = Page { items: vec![1, 2], pagination: Pagination::new(PageRequest::default(), 2) };
    let json = serde_json::to_value(ListEnvelope::from(page)).unwrap();
    assert_eq!(
      json,
      serde_json::json!({
        "success": true,
        "data": [1, 2],
        "pagination": { "page": 1, "limit": 10, "total_pages": 1, "total_items": 2 }
      })
    );
  }

  #[test]
  fn message_envelope_omits_data() {
    let json = serde_json::to_value(Envelope::message("Ward deleted")).unwrap();
    assert_eq!(json, serde_json::json!({ "success": true, "message": "Ward deleted" }));
  }

  #[test]
  fn envelope_decodes_payloads_without_default() {
    let json = serde_json::json!({
      "success": true,
      "data": {
        "wardId": "6f1c8e52-3a4b-4c2d-9e8f-0a1b2c3d4e5f",
        "wardName": "East",
        "supervisorId": null,
        "createdAt": "2024-03-01T10:00:00Z"
      }
    });
    let envelope: Envelope<Ward> = serde_json::from_value(json).unwrap();
    let ward = envelope.data.unwrap();
    assert_eq!(ward.ward_name, "East");
    assert_eq!(ward.supervisor_id, None);

    let bare: Envelope<Ward> =
      serde_json::from_value(serde_json::json!({ "success": true, "message": "ok" })).unwrap();
    assert!(bare.data.is_none());
    assert_eq!(bare.message.as_deref(), Some("ok"));
  }
}
