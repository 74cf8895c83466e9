//! Trackers, scan logs and citizen reports.

use rusqlite::{Connection, OptionalExtension as _, params};
use tracing::debug;
use uuid::Uuid;
use wardwatch_core::{
  Entity,
  activity::{
    CitizenReport, NewCitizenReport, NewScanLog, NewTracker, ReportPatch,
    ScanLog, ScanLogRow, Tracker,
  },
  query::{Page, ReportQuery, ScanLogQuery, SortOrder},
};

use crate::{
  Result,
  encode::{
    RawReport, RawScanLogRow, RawTracker, REPORT_COLUMNS, SCAN_COLUMNS, encode_dt,
    encode_report_priority, encode_report_status, encode_scan_method,
    encode_tracker_method, encode_uuid, now,
  },
  listing::{Listing, Predicate, into_page, order_by},
  store::{ensure_reference, not_found},
};

// ─── Trackers ────────────────────────────────────────────────────────────────

pub fn add_tracker(conn: &Connection, input: NewTracker) -> Result<Tracker> {
  if let Some(house) = input.house_id {
    ensure_reference(conn, "houseId", Entity::Household, encode_uuid(house))?;
  }

  let created_at = encode_dt(now());
  let raw = conn.query_row(
    "INSERT INTO trackers (created_at, method, house_id) VALUES (?1, ?2, ?3)
     RETURNING tracker_id, created_at, method, house_id",
    params![
      created_at,
      encode_tracker_method(input.method),
      input.house_id.map(encode_uuid),
    ],
    |r| {
      Ok(RawTracker {
        tracker_id: r.get(0)?,
        created_at: r.get(1)?,
        method:     r.get(2)?,
        house_id:   r.get(3)?,
      })
    },
  )?;

  debug!(tracker_id = raw.tracker_id, "tracker registered");
  raw.into_tracker()
}

// ─── Scan logs ───────────────────────────────────────────────────────────────

const SCAN_FROM: &str = "scan_logs sl
  JOIN households hh ON hh.house_id = sl.house_id
  LEFT JOIN workers wk ON wk.worker_id = sl.worker_id
  LEFT JOIN wards wd ON wd.ward_id = hh.ward_id";

pub fn record_scan(conn: &Connection, input: NewScanLog) -> Result<ScanLog> {
  ensure_reference(conn, "houseId", Entity::Household, encode_uuid(input.house_id))?;
  if let Some(worker) = input.worker_id {
    ensure_reference(conn, "workerId", Entity::Worker, encode_uuid(worker))?;
  }

  let scan = ScanLog {
    scan_id:       Uuid::new_v4(),
    house_id:      input.house_id,
    worker_id:     input.worker_id,
    timestamp:     now(),
    gps_latitude:  input.gps_latitude,
    gps_longitude: input.gps_longitude,
    sync_status:   input.sync_status,
    scan_method:   input.scan_method,
  };

  conn.execute(
    "INSERT INTO scan_logs
       (scan_id, house_id, worker_id, timestamp, gps_latitude, gps_longitude,
        sync_status, scan_method)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    params![
      encode_uuid(scan.scan_id),
      encode_uuid(scan.house_id),
      scan.worker_id.map(encode_uuid),
      encode_dt(scan.timestamp),
      scan.gps_latitude,
      scan.gps_longitude,
      scan.sync_status,
      encode_scan_method(scan.scan_method),
    ],
  )?;
  Ok(scan)
}

pub fn list_scans(conn: &Connection, query: &ScanLogQuery) -> Result<Page<ScanLogRow>> {
  let mut predicate = Predicate::new();
  if let Some(house) = query.house_id {
    predicate.equals("sl.house_id", encode_uuid(house));
  }
  if let Some(worker) = query.worker_id {
    predicate.equals("sl.worker_id", encode_uuid(worker));
  }
  if let Some(method) = query.method {
    predicate.equals("sl.scan_method", encode_scan_method(method).to_owned());
  }
  if let Some(synced) = query.synced {
    predicate.equals("sl.sync_status", i64::from(synced));
  }

  let listing = Listing {
    columns: format!("{SCAN_COLUMNS}, wk.worker_name, hh.address, wd.ward_name"),
    from: SCAN_FROM,
    predicate,
    order_by: order_by("sl.timestamp", SortOrder::Desc, "sl.scan_id"),
    page: query.page,
  };
  let (raw, total) = listing.run(conn, RawScanLogRow::read)?;
  into_page(raw, total, query.page, RawScanLogRow::into_row)
}

// ─── Citizen reports ─────────────────────────────────────────────────────────

fn fetch_report(conn: &Connection, id: Uuid) -> Result<Option<CitizenReport>> {
  conn
    .query_row(
      &format!("SELECT {REPORT_COLUMNS} FROM citizen_reports cr WHERE cr.report_id = ?1"),
      [encode_uuid(id)],
      RawReport::read,
    )
    .optional()?
    .map(RawReport::into_report)
    .transpose()
}

pub fn file_report(conn: &Connection, input: NewCitizenReport) -> Result<CitizenReport> {
  ensure_reference(conn, "houseId", Entity::Household, encode_uuid(input.house_id))?;

  let report = CitizenReport {
    report_id:        Uuid::new_v4(),
    house_id:         input.house_id,
    citizen_contact:  input.citizen_contact,
    timestamp:        now(),
    status:           Default::default(),
    priority:         input.priority,
    additional_notes: input.additional_notes,
  };

  conn.execute(
    "INSERT INTO citizen_reports
       (report_id, house_id, citizen_contact, timestamp, status, priority,
        additional_notes)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    params![
      encode_uuid(report.report_id),
      encode_uuid(report.house_id),
      report.citizen_contact,
      encode_dt(report.timestamp),
      encode_report_status(report.status),
      report.priority.map(encode_report_priority),
      report.additional_notes,
    ],
  )?;

  debug!(report_id = %report.report_id, "citizen report filed");
  Ok(report)
}

pub fn list_reports(conn: &Connection, query: &ReportQuery) -> Result<Page<CitizenReport>> {
  let mut predicate = Predicate::new();
  if let Some(term) = wardwatch_core::query::non_blank(query.search.as_deref()) {
    predicate.any_contains(&["cr.citizen_contact", "cr.additional_notes"], term);
  }
  if let Some(status) = query.status {
    predicate.equals("cr.status", encode_report_status(status).to_owned());
  }
  if let Some(priority) = query.priority {
    predicate.equals("cr.priority", encode_report_priority(priority).to_owned());
  }

  let listing = Listing {
    columns: REPORT_COLUMNS.to_owned(),
    from: "citizen_reports cr",
    predicate,
    order_by: order_by("cr.timestamp", SortOrder::Desc, "cr.report_id"),
    page: query.page,
  };
  let (raw, total) = listing.run(conn, RawReport::read)?;
  into_page(raw, total, query.page, RawReport::into_report)
}

pub fn update_report(
  conn: &Connection,
  id: Uuid,
  patch: ReportPatch,
) -> Result<CitizenReport> {
  let current =
    fetch_report(conn, id)?.ok_or_else(|| not_found(Entity::CitizenReport, id))?;

  let report = CitizenReport {
    status: patch.status.unwrap_or(current.status),
    priority: patch.priority.apply(current.priority),
    additional_notes: patch.additional_notes.apply(current.additional_notes),
    ..current
  };

  conn.execute(
    "UPDATE citizen_reports SET status = ?2, priority = ?3, additional_notes = ?4
      WHERE report_id = ?1",
    params![
      encode_uuid(id),
      encode_report_status(report.status),
      report.priority.map(encode_report_priority),
      report.additional_notes,
    ],
  )?;

  debug!(report_id = %id, status = ?report.status, "citizen report updated");
  Ok(report)
}
