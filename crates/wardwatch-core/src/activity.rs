//! Field activity: tracker devices, scan logs and citizen reports.
//!
//! These rows hang off households. Deleting a household cascades to its scan
//! logs and reports; deleting a worker nulls out the worker on its scan logs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Patch;

// ─── Trackers ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackerMethod {
  #[default]
  Nfc,
  QrCode,
}

/// A tag or code fixed to a household.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tracker {
  pub tracker_id: i64,
  pub created_at: DateTime<Utc>,
  pub method:     TrackerMethod,
  pub house_id:   Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTracker {
  #[serde(default)]
  pub method:   TrackerMethod,
  #[serde(default)]
  pub house_id: Option<Uuid>,
}

// ─── Scan logs ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMethod {
  #[default]
  Nfc,
  Manual,
}

/// A worker's scan of a household.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanLog {
  pub scan_id:       Uuid,
  pub house_id:      Uuid,
  /// `None` once the scanning worker has been deleted.
  pub worker_id:     Option<Uuid>,
  pub timestamp:     DateTime<Utc>,
  pub gps_latitude:  Option<f64>,
  pub gps_longitude: Option<f64>,
  /// Whether the scanning device has synced this record upstream.
  pub sync_status:   bool,
  pub scan_method:   ScanMethod,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewScanLog {
  pub house_id:      Uuid,
  #[serde(default)]
  pub worker_id:     Option<Uuid>,
  #[serde(default)]
  pub gps_latitude:  Option<f64>,
  #[serde(default)]
  pub gps_longitude: Option<f64>,
  #[serde(default)]
  pub sync_status:   bool,
  #[serde(default)]
  pub scan_method:   ScanMethod,
}

/// A scan joined with the display data an operator needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanLogRow {
  #[serde(flatten)]
  pub scan:        ScanLog,
  pub worker_name: Option<String>,
  pub address:     String,
  pub ward_name:   Option<String>,
}

// ─── Citizen reports ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
  #[default]
  Open,
  InProgress,
  Resolved,
  Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportPriority {
  Low,
  Medium,
  High,
}

/// A complaint or service request tied to a household.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitizenReport {
  pub report_id:        Uuid,
  pub house_id:         Uuid,
  pub citizen_contact:  String,
  pub timestamp:        DateTime<Utc>,
  pub status:           ReportStatus,
  pub priority:         Option<ReportPriority>,
  pub additional_notes: Option<String>,
}

/// Input to [`crate::store::WasteStore::file_report`]. New reports are always
/// `open`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCitizenReport {
  pub house_id:         Uuid,
  pub citizen_contact:  String,
  #[serde(default)]
  pub priority:         Option<ReportPriority>,
  #[serde(default)]
  pub additional_notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPatch {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub status:           Option<ReportStatus>,
  #[serde(default, skip_serializing_if = "Patch::is_keep")]
  pub priority:         Patch<ReportPriority>,
  #[serde(default, skip_serializing_if = "Patch::is_keep")]
  pub additional_notes: Patch<String>,
}

impl ReportPatch {
  pub fn is_empty(&self) -> bool {
    self.status.is_none()
      && self.priority.is_keep()
      && self.additional_notes.is_keep()
  }
}
