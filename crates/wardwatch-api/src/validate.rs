//! Request-boundary validation. Runs before any store access and collects
//! every failing field into one 400 response.

use wardwatch_core::{
  activity::{NewCitizenReport, NewScanLog, ReportPatch},
  envelope::FieldError,
  household::{HouseholdPatch, NewHousehold},
  ward::{NewWard, WardPatch},
  worker::{NewWorker, WorkerPatch},
};

use crate::error::ApiError;

pub const MAX_TEXT: usize = 255;

#[derive(Default)]
struct Checks {
  details: Vec<FieldError>,
}

impl Checks {
  /// Trimmed `value`, recording a failure when it is blank or too long.
  fn text(&mut self, field: &'static str, label: &str, value: String) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
      self.details.push(FieldError::new(field, format!("{label} is required")));
    } else if trimmed.chars().count() > MAX_TEXT {
      self.details.push(FieldError::new(
        field,
        format!("{label} must be at most {MAX_TEXT} characters"),
      ));
    }
    trimmed.to_owned()
  }

  fn opt_text(
    &mut self,
    field: &'static str,
    label: &str,
    value: Option<String>,
  ) -> Option<String> {
    value.map(|v| self.text(field, label, v))
  }

  fn range(&mut self, field: &'static str, value: Option<f64>, bound: f64) {
    match value {
      Some(v) if !(-bound..=bound).contains(&v) => self
        .details
        .push(FieldError::new(field, format!("must be between -{bound} and {bound}"))),
      _ => {}
    }
  }

  fn finish<T>(self, value: T) -> Result<T, ApiError> {
    if self.details.is_empty() {
      Ok(value)
    } else {
      Err(ApiError::validation(self.details))
    }
  }
}

fn nothing_to_update() -> ApiError {
  ApiError::invalid("body", "at least one field must be supplied")
}

// ─── Wards ───────────────────────────────────────────────────────────────────

pub fn new_ward(input: NewWard) -> Result<NewWard, ApiError> {
  let mut checks = Checks::default();
  let ward_name = checks.text("wardName", "Ward name", input.ward_name);
  checks.finish(NewWard { ward_name, ..input })
}

pub fn ward_patch(patch: WardPatch) -> Result<WardPatch, ApiError> {
  if patch.is_empty() {
    return Err(nothing_to_update());
  }
  let mut checks = Checks::default();
  let ward_name = checks.opt_text("wardName", "Ward name", patch.ward_name);
  checks.finish(WardPatch { ward_name, ..patch })
}

// ─── Workers ─────────────────────────────────────────────────────────────────

pub fn new_worker(input: NewWorker) -> Result<NewWorker, ApiError> {
  let mut checks = Checks::default();
  let worker_name = checks.text("workerName", "Worker name", input.worker_name);
  let contact_number =
    checks.text("contactNumber", "Contact number", input.contact_number);
  checks.finish(NewWorker { worker_name, contact_number, ..input })
}

pub fn worker_patch(patch: WorkerPatch) -> Result<WorkerPatch, ApiError> {
  if patch.is_empty() {
    return Err(nothing_to_update());
  }
  let mut checks = Checks::default();
  let worker_name = checks.opt_text("workerName", "Worker name", patch.worker_name);
  let contact_number =
    checks.opt_text("contactNumber", "Contact number", patch.contact_number);
  checks.finish(WorkerPatch { worker_name, contact_number, ..patch })
}

// ─── Households ──────────────────────────────────────────────────────────────

pub fn new_household(input: NewHousehold) -> Result<NewHousehold, ApiError> {
  let mut checks = Checks::default();
  let owner_number = checks.text("ownerNumber", "Owner number", input.owner_number);
  let address = checks.text("address", "Address", input.address);
  checks.finish(NewHousehold { owner_number, address, ..input })
}

pub fn household_patch(patch: HouseholdPatch) -> Result<HouseholdPatch, ApiError> {
  if patch.is_empty() {
    return Err(nothing_to_update());
  }
  let mut checks = Checks::default();
  let owner_number = checks.opt_text("ownerNumber", "Owner number", patch.owner_number);
  let address = checks.opt_text("address", "Address", patch.address);
  checks.finish(HouseholdPatch { owner_number, address, ..patch })
}

// ─── Field activity ──────────────────────────────────────────────────────────

pub fn new_scan(input: NewScanLog) -> Result<NewScanLog, ApiError> {
  let mut checks = Checks::default();
  checks.range("gpsLatitude", input.gps_latitude, 90.0);
  checks.range("gpsLongitude", input.gps_longitude, 180.0);
  checks.finish(input)
}

pub fn new_report(input: NewCitizenReport) -> Result<NewCitizenReport, ApiError> {
  let mut checks = Checks::default();
  let citizen_contact =
    checks.text("citizenContact", "Citizen contact", input.citizen_contact);
  checks.finish(NewCitizenReport { citizen_contact, ..input })
}

pub fn report_patch(patch: ReportPatch) -> Result<ReportPatch, ApiError> {
  if patch.is_empty() {
    return Err(nothing_to_update());
  }
  Ok(patch)
}

#[cfg(test)]
mod tests {
  use wardwatch_core::Patch;

  use super::*;

  fn fields(err: ApiError) -> Vec<String> {
    match err {
      ApiError::Validation { details, .. } => details.into_iter().map(|d| d.field).collect(),
      other => panic!("expected validation error, got {other:?}"),
    }
  }

  #[test]
  fn text_is_trimmed() {
    let ward = new_ward(NewWard { ward_name: "  East Ward ".into(), supervisor_id: None }).unwrap();
    assert_eq!(ward.ward_name, "East Ward");
  }

  #[test]
  fn every_failing_field_is_reported() {
    let err = new_worker(NewWorker {
      worker_name: " ".into(),
      contact_number: "9".repeat(MAX_TEXT + 1),
      ward_id: None,
      status: true,
    })
    .unwrap_err();
    assert_eq!(fields(err), ["workerName", "contactNumber"]);
  }

  #[test]
  fn empty_patch_is_rejected() {
    assert_eq!(fields(ward_patch(WardPatch::default()).unwrap_err()), ["body"]);
    assert_eq!(fields(report_patch(ReportPatch::default()).unwrap_err()), ["body"]);
  }

  #[test]
  fn clearing_a_reference_counts_as_a_field() {
    let patch = HouseholdPatch { ward_id: Patch::Clear, ..Default::default() };
    assert!(household_patch(patch).is_ok());
  }

  #[test]
  fn coordinates_must_be_on_the_globe() {
    let scan = NewScanLog {
      house_id:      uuid::Uuid::nil(),
      worker_id:     None,
      gps_latitude:  Some(91.0),
      gps_longitude: Some(-180.0),
      sync_status:   false,
      scan_method:   Default::default(),
    };
    assert_eq!(fields(new_scan(scan).unwrap_err()), ["gpsLatitude"]);
  }
}
