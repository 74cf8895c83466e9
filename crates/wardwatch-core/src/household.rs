//! Households: registered address/owner units, optionally tagged with a
//! tracker device and assigned to a ward.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Patch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HouseholdStatus {
  #[default]
  Active,
  Inactive,
  Suspended,
}

/// A stored household row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Household {
  pub house_id:     Uuid,
  pub owner_number: String,
  pub address:      String,
  pub status:       HouseholdStatus,
  pub ward_id:      Option<Uuid>,
  pub tracker_id:   Option<i64>,
  pub date_created: DateTime<Utc>,
  /// Refreshed on every update.
  pub date_updated: DateTime<Utc>,
}

/// Input to [`crate::store::WasteStore::add_household`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHousehold {
  pub owner_number: String,
  pub address:      String,
  #[serde(default)]
  pub status:       HouseholdStatus,
  #[serde(default)]
  pub ward_id:      Option<Uuid>,
  #[serde(default)]
  pub tracker_id:   Option<i64>,
}

/// Sparse update of a household.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseholdPatch {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub owner_number: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub address:      Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub status:       Option<HouseholdStatus>,
  #[serde(default, skip_serializing_if = "Patch::is_keep")]
  pub ward_id:      Patch<Uuid>,
  #[serde(default, skip_serializing_if = "Patch::is_keep")]
  pub tracker_id:   Patch<i64>,
}

impl HouseholdPatch {
  pub fn is_empty(&self) -> bool {
    self.owner_number.is_none()
      && self.address.is_none()
      && self.status.is_none()
      && self.ward_id.is_keep()
      && self.tracker_id.is_keep()
  }
}

/// A household joined with the name of its ward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseholdRow {
  #[serde(flatten)]
  pub household: Household,
  pub ward_name: Option<String>,
}
