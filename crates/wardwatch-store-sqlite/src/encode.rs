//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`
//! suffix) so that string comparison in SQL matches chronological order.
//! UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Row;
use uuid::Uuid;
use wardwatch_core::{
  activity::{
    CitizenReport, ReportPriority, ReportStatus, ScanLog, ScanLogRow, ScanMethod,
    Tracker, TrackerMethod,
  },
  household::{Household, HouseholdRow, HouseholdStatus},
  ward::{Ward, WardRow},
  worker::{Worker, WorkerRow},
};

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

fn decode_opt_uuid(s: Option<String>) -> Result<Option<Uuid>> {
  s.as_deref().map(decode_uuid).transpose()
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

/// Current time truncated to the precision we store, so values returned from
/// an insert compare equal to values read back later.
pub fn now() -> DateTime<Utc> {
  let now = Utc::now();
  decode_dt(&encode_dt(now)).unwrap_or(now)
}

// ─── Enums ───────────────────────────────────────────────────────────────────

pub fn encode_household_status(s: HouseholdStatus) -> &'static str {
  match s {
    HouseholdStatus::Active => "active",
    HouseholdStatus::Inactive => "inactive",
    HouseholdStatus::Suspended => "suspended",
  }
}

pub fn decode_household_status(s: &str) -> Result<HouseholdStatus> {
  match s {
    "active" => Ok(HouseholdStatus::Active),
    "inactive" => Ok(HouseholdStatus::Inactive),
    "suspended" => Ok(HouseholdStatus::Suspended),
    other => Err(Error::Decode { column: "households.status", value: other.into() }),
  }
}

pub fn encode_scan_method(m: ScanMethod) -> &'static str {
  match m {
    ScanMethod::Nfc => "nfc",
    ScanMethod::Manual => "manual",
  }
}

pub fn decode_scan_method(s: &str) -> Result<ScanMethod> {
  match s {
    "nfc" => Ok(ScanMethod::Nfc),
    "manual" => Ok(ScanMethod::Manual),
    other => Err(Error::Decode { column: "scan_logs.scan_method", value: other.into() }),
  }
}

pub fn encode_tracker_method(m: TrackerMethod) -> &'static str {
  match m {
    TrackerMethod::Nfc => "nfc",
    TrackerMethod::QrCode => "qr_code",
  }
}

pub fn decode_tracker_method(s: &str) -> Result<TrackerMethod> {
  match s {
    "nfc" => Ok(TrackerMethod::Nfc),
    "qr_code" => Ok(TrackerMethod::QrCode),
    other => Err(Error::Decode { column: "trackers.method", value: other.into() }),
  }
}

pub fn encode_report_status(s: ReportStatus) -> &'static str {
  match s {
    ReportStatus::Open => "open",
    ReportStatus::InProgress => "in_progress",
    ReportStatus::Resolved => "resolved",
    ReportStatus::Closed => "closed",
  }
}

pub fn decode_report_status(s: &str) -> Result<ReportStatus> {
  match s {
    "open" => Ok(ReportStatus::Open),
    "in_progress" => Ok(ReportStatus::InProgress),
    "resolved" => Ok(ReportStatus::Resolved),
    "closed" => Ok(ReportStatus::Closed),
    other => Err(Error::Decode { column: "citizen_reports.status", value: other.into() }),
  }
}

pub fn encode_report_priority(p: ReportPriority) -> &'static str {
  match p {
    ReportPriority::Low => "low",
    ReportPriority::Medium => "medium",
    ReportPriority::High => "high",
  }
}

pub fn decode_report_priority(s: &str) -> Result<ReportPriority> {
  match s {
    "low" => Ok(ReportPriority::Low),
    "medium" => Ok(ReportPriority::Medium),
    "high" => Ok(ReportPriority::High),
    other => Err(Error::Decode { column: "citizen_reports.priority", value: other.into() }),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────
//
// Each raw type reads a fixed column list starting at a given index, so the
// joined row types can append their extra columns after the base ones.

/// Columns read by [`RawWard::read`], for the `wd` alias.
pub const WARD_COLUMNS: &str = "wd.ward_id, wd.ward_name, wd.supervisor_id, wd.created_at";

pub struct RawWard {
  pub ward_id:       String,
  pub ward_name:     String,
  pub supervisor_id: Option<String>,
  pub created_at:    String,
}

impl RawWard {
  pub const WIDTH: usize = 4;

  pub fn read(row: &Row<'_>, at: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      ward_id:       row.get(at)?,
      ward_name:     row.get(at + 1)?,
      supervisor_id: row.get(at + 2)?,
      created_at:    row.get(at + 3)?,
    })
  }

  pub fn into_ward(self) -> Result<Ward> {
    Ok(Ward {
      ward_id:       decode_uuid(&self.ward_id)?,
      ward_name:     self.ward_name,
      supervisor_id: decode_opt_uuid(self.supervisor_id)?,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// A ward followed by supervisor name, worker count and household count.
pub struct RawWardRow {
  pub ward:            RawWard,
  pub supervisor_name: Option<String>,
  pub worker_count:    i64,
  pub household_count: i64,
}

impl RawWardRow {
  pub fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
    let at = RawWard::WIDTH;
    Ok(Self {
      ward:            RawWard::read(row, 0)?,
      supervisor_name: row.get(at)?,
      worker_count:    row.get(at + 1)?,
      household_count: row.get(at + 2)?,
    })
  }

  pub fn into_row(self) -> Result<WardRow> {
    Ok(WardRow {
      ward:            self.ward.into_ward()?,
      supervisor_name: self.supervisor_name,
      worker_count:    self.worker_count.max(0) as u64,
      household_count: self.household_count.max(0) as u64,
    })
  }
}

pub const WORKER_COLUMNS: &str =
  "wk.worker_id, wk.worker_name, wk.contact_number, wk.ward_id, wk.status, wk.date_created";

pub struct RawWorker {
  pub worker_id:      String,
  pub worker_name:    String,
  pub contact_number: String,
  pub ward_id:        Option<String>,
  pub status:         bool,
  pub date_created:   String,
}

impl RawWorker {
  pub const WIDTH: usize = 6;

  pub fn read(row: &Row<'_>, at: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      worker_id:      row.get(at)?,
      worker_name:    row.get(at + 1)?,
      contact_number: row.get(at + 2)?,
      ward_id:        row.get(at + 3)?,
      status:         row.get(at + 4)?,
      date_created:   row.get(at + 5)?,
    })
  }

  pub fn into_worker(self) -> Result<Worker> {
    Ok(Worker {
      worker_id:      decode_uuid(&self.worker_id)?,
      worker_name:    self.worker_name,
      contact_number: self.contact_number,
      ward_id:        decode_opt_uuid(self.ward_id)?,
      status:         self.status,
      date_created:   decode_dt(&self.date_created)?,
    })
  }
}

/// A worker followed by the joined ward name.
pub struct RawWorkerRow {
  pub worker:    RawWorker,
  pub ward_name: Option<String>,
}

impl RawWorkerRow {
  pub fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      worker:    RawWorker::read(row, 0)?,
      ward_name: row.get(RawWorker::WIDTH)?,
    })
  }

  pub fn into_row(self) -> Result<WorkerRow> {
    Ok(WorkerRow { worker: self.worker.into_worker()?, ward_name: self.ward_name })
  }
}

pub const HOUSEHOLD_COLUMNS: &str = "hh.house_id, hh.owner_number, hh.address, hh.status, \
   hh.ward_id, hh.tracker_id, hh.date_created, hh.date_updated";

pub struct RawHousehold {
  pub house_id:     String,
  pub owner_number: String,
  pub address:      String,
  pub status:       String,
  pub ward_id:      Option<String>,
  pub tracker_id:   Option<i64>,
  pub date_created: String,
  pub date_updated: String,
}

impl RawHousehold {
  pub const WIDTH: usize = 8;

  pub fn read(row: &Row<'_>, at: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      house_id:     row.get(at)?,
      owner_number: row.get(at + 1)?,
      address:      row.get(at + 2)?,
      status:       row.get(at + 3)?,
      ward_id:      row.get(at + 4)?,
      tracker_id:   row.get(at + 5)?,
      date_created: row.get(at + 6)?,
      date_updated: row.get(at + 7)?,
    })
  }

  pub fn into_household(self) -> Result<Household> {
    Ok(Household {
      house_id:     decode_uuid(&self.house_id)?,
      owner_number: self.owner_number,
      address:      self.address,
      status:       decode_household_status(&self.status)?,
      ward_id:      decode_opt_uuid(self.ward_id)?,
      tracker_id:   self.tracker_id,
      date_created: decode_dt(&self.date_created)?,
      date_updated: decode_dt(&self.date_updated)?,
    })
  }
}

pub struct RawHouseholdRow {
  pub household: RawHousehold,
  pub ward_name: Option<String>,
}

impl RawHouseholdRow {
  pub fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      household: RawHousehold::read(row, 0)?,
      ward_name: row.get(RawHousehold::WIDTH)?,
    })
  }

  pub fn into_row(self) -> Result<HouseholdRow> {
    Ok(HouseholdRow {
      household: self.household.into_household()?,
      ward_name: self.ward_name,
    })
  }
}

pub struct RawTracker {
  pub tracker_id: i64,
  pub created_at: String,
  pub method:     String,
  pub house_id:   Option<String>,
}

impl RawTracker {
  pub fn into_tracker(self) -> Result<Tracker> {
    Ok(Tracker {
      tracker_id: self.tracker_id,
      created_at: decode_dt(&self.created_at)?,
      method:     decode_tracker_method(&self.method)?,
      house_id:   decode_opt_uuid(self.house_id)?,
    })
  }
}

pub const SCAN_COLUMNS: &str = "sl.scan_id, sl.house_id, sl.worker_id, sl.timestamp, \
   sl.gps_latitude, sl.gps_longitude, sl.sync_status, sl.scan_method";

pub struct RawScanLog {
  pub scan_id:       String,
  pub house_id:      String,
  pub worker_id:     Option<String>,
  pub timestamp:     String,
  pub gps_latitude:  Option<f64>,
  pub gps_longitude: Option<f64>,
  pub sync_status:   bool,
  pub scan_method:   String,
}

impl RawScanLog {
  pub const WIDTH: usize = 8;

  pub fn read(row: &Row<'_>, at: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      scan_id:       row.get(at)?,
      house_id:      row.get(at + 1)?,
      worker_id:     row.get(at + 2)?,
      timestamp:     row.get(at + 3)?,
      gps_latitude:  row.get(at + 4)?,
      gps_longitude: row.get(at + 5)?,
      sync_status:   row.get(at + 6)?,
      scan_method:   row.get(at + 7)?,
    })
  }

  pub fn into_scan(self) -> Result<ScanLog> {
    Ok(ScanLog {
      scan_id:       decode_uuid(&self.scan_id)?,
      house_id:      decode_uuid(&self.house_id)?,
      worker_id:     decode_opt_uuid(self.worker_id)?,
      timestamp:     decode_dt(&self.timestamp)?,
      gps_latitude:  self.gps_latitude,
      gps_longitude: self.gps_longitude,
      sync_status:   self.sync_status,
      scan_method:   decode_scan_method(&self.scan_method)?,
    })
  }
}

/// A scan followed by worker name, household address and ward name.
pub struct RawScanLogRow {
  pub scan:        RawScanLog,
  pub worker_name: Option<String>,
  pub address:     String,
  pub ward_name:   Option<String>,
}

impl RawScanLogRow {
  pub fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
    let at = RawScanLog::WIDTH;
    Ok(Self {
      scan:        RawScanLog::read(row, 0)?,
      worker_name: row.get(at)?,
      address:     row.get(at + 1)?,
      ward_name:   row.get(at + 2)?,
    })
  }

  pub fn into_row(self) -> Result<ScanLogRow> {
    Ok(ScanLogRow {
      scan:        self.scan.into_scan()?,
      worker_name: self.worker_name,
      address:     self.address,
      ward_name:   self.ward_name,
    })
  }
}

pub const REPORT_COLUMNS: &str = "cr.report_id, cr.house_id, cr.citizen_contact, cr.timestamp, \
   cr.status, cr.priority, cr.additional_notes";

pub struct RawReport {
  pub report_id:        String,
  pub house_id:         String,
  pub citizen_contact:  String,
  pub timestamp:        String,
  pub status:           String,
  pub priority:         Option<String>,
  pub additional_notes: Option<String>,
}

impl RawReport {
  pub fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      report_id:        row.get(0)?,
      house_id:         row.get(1)?,
      citizen_contact:  row.get(2)?,
      timestamp:        row.get(3)?,
      status:           row.get(4)?,
      priority:         row.get(5)?,
      additional_notes: row.get(6)?,
    })
  }

  pub fn into_report(self) -> Result<CitizenReport> {
    Ok(CitizenReport {
      report_id:        decode_uuid(&self.report_id)?,
      house_id:         decode_uuid(&self.house_id)?,
      citizen_contact:  self.citizen_contact,
      timestamp:        decode_dt(&self.timestamp)?,
      status:           decode_report_status(&self.status)?,
      priority:         self
        .priority
        .as_deref()
        .map(decode_report_priority)
        .transpose()?,
      additional_notes: self.additional_notes,
    })
  }
}
