//! Wards: administrative districts, each with an optional supervising
//! worker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Patch;

/// A stored ward row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ward {
  pub ward_id:       Uuid,
  pub ward_name:     String,
  /// Must reference an existing worker when set.
  pub supervisor_id: Option<Uuid>,
  pub created_at:    DateTime<Utc>,
}

/// Input to [`crate::store::WasteStore::add_ward`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWard {
  pub ward_name:     String,
  #[serde(default)]
  pub supervisor_id: Option<Uuid>,
}

/// Sparse update of a ward.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WardPatch {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub ward_name:     Option<String>,
  #[serde(default, skip_serializing_if = "Patch::is_keep")]
  pub supervisor_id: Patch<Uuid>,
}

impl WardPatch {
  pub fn is_empty(&self) -> bool {
    self.ward_name.is_none() && self.supervisor_id.is_keep()
  }
}

/// A ward joined with its supervisor's name and per-ward aggregate counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WardRow {
  #[serde(flatten)]
  pub ward:            Ward,
  pub supervisor_name: Option<String>,
  pub worker_count:    u64,
  pub household_count: u64,
}
