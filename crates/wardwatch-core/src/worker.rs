//! Workers: field employees, optionally assigned to a ward.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Patch;

/// A stored worker row. `contact_number` is unique across all workers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Worker {
  pub worker_id:      Uuid,
  pub worker_name:    String,
  pub contact_number: String,
  pub ward_id:        Option<Uuid>,
  /// `true` when the worker is active.
  pub status:         bool,
  pub date_created:   DateTime<Utc>,
}

/// Input to [`crate::store::WasteStore::add_worker`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWorker {
  pub worker_name:    String,
  pub contact_number: String,
  #[serde(default)]
  pub ward_id:        Option<Uuid>,
  #[serde(default)]
  pub status:         bool,
}

/// Sparse update of a worker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerPatch {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub worker_name:    Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub contact_number: Option<String>,
  #[serde(default, skip_serializing_if = "Patch::is_keep")]
  pub ward_id:        Patch<Uuid>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub status:         Option<bool>,
}

impl WorkerPatch {
  pub fn is_empty(&self) -> bool {
    self.worker_name.is_none()
      && self.contact_number.is_none()
      && self.ward_id.is_keep()
      && self.status.is_none()
  }
}

/// A worker joined with the name of the ward they are assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerRow {
  #[serde(flatten)]
  pub worker:    Worker,
  pub ward_name: Option<String>,
}
