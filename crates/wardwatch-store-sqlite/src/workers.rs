//! Worker queries.

use rusqlite::{Connection, OptionalExtension as _, params};
use tracing::debug;
use uuid::Uuid;
use wardwatch_core::{
  Entity,
  query::{Page, WorkerQuery, WorkerSort},
  worker::{NewWorker, Worker, WorkerPatch, WorkerRow},
};

use crate::{
  Result,
  encode::{RawWorker, RawWorkerRow, WORKER_COLUMNS, encode_dt, encode_uuid, now},
  listing::{Listing, Predicate, into_page, order_by},
  store::{delete_by_id, ensure_reference, ensure_unique, not_found, on_conflict},
};

const FROM: &str = "workers wk LEFT JOIN wards wd ON wd.ward_id = wk.ward_id";

const CONTACT_TAKEN: &str =
  "SELECT 1 FROM workers WHERE contact_number = ?1 AND worker_id IS NOT ?2";

fn row_columns() -> String { format!("{WORKER_COLUMNS}, wd.ward_name") }

fn sort_expr(key: WorkerSort) -> &'static str {
  match key {
    WorkerSort::WorkerId => "wk.worker_id",
    WorkerSort::WorkerName => "wk.worker_name",
    WorkerSort::ContactNumber => "wk.contact_number",
    WorkerSort::WardId => "wk.ward_id",
    WorkerSort::DateCreated => "wk.date_created",
    WorkerSort::Status => "wk.status",
    WorkerSort::WardName => "wd.ward_name",
  }
}

pub fn list(conn: &Connection, query: &WorkerQuery) -> Result<Page<WorkerRow>> {
  let mut predicate = Predicate::new();
  if let Some(term) = query.filter.search_term() {
    predicate.any_contains(&["wk.worker_name", "wk.contact_number"], term);
  }
  if let Some(ward) = query.filter.ward_term() {
    predicate.any_contains(&["wd.ward_name"], ward);
  }
  predicate.created_within("wk.date_created", &query.filter.created);

  let listing = Listing {
    columns: row_columns(),
    from: FROM,
    predicate,
    order_by: order_by(sort_expr(query.sort_by), query.sort_order, "wk.worker_id"),
    page: query.page,
  };
  let (raw, total) = listing.run(conn, RawWorkerRow::read)?;
  into_page(raw, total, query.page, RawWorkerRow::into_row)
}

pub fn get(conn: &Connection, id: Uuid) -> Result<Option<WorkerRow>> {
  conn
    .query_row(
      &format!("SELECT {} FROM {FROM} WHERE wk.worker_id = ?1", row_columns()),
      [encode_uuid(id)],
      RawWorkerRow::read,
    )
    .optional()?
    .map(RawWorkerRow::into_row)
    .transpose()
}

fn fetch(conn: &Connection, id: Uuid) -> Result<Option<Worker>> {
  conn
    .query_row(
      &format!("SELECT {WORKER_COLUMNS} FROM workers wk WHERE wk.worker_id = ?1"),
      [encode_uuid(id)],
      |r| RawWorker::read(r, 0),
    )
    .optional()?
    .map(RawWorker::into_worker)
    .transpose()
}

pub fn add(conn: &Connection, input: NewWorker) -> Result<Worker> {
  ensure_unique(
    conn,
    Entity::Worker,
    "contactNumber",
    CONTACT_TAKEN,
    &input.contact_number,
    None,
  )?;
  if let Some(ward) = input.ward_id {
    ensure_reference(conn, "wardId", Entity::Ward, encode_uuid(ward))?;
  }

  let worker = Worker {
    worker_id:      Uuid::new_v4(),
    worker_name:    input.worker_name,
    contact_number: input.contact_number,
    ward_id:        input.ward_id,
    status:         input.status,
    date_created:   now(),
  };

  on_conflict(
    conn.execute(
      "INSERT INTO workers
         (worker_id, worker_name, contact_number, ward_id, status, date_created)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
      params![
        encode_uuid(worker.worker_id),
        worker.worker_name,
        worker.contact_number,
        worker.ward_id.map(encode_uuid),
        worker.status,
        encode_dt(worker.date_created),
      ],
    ),
    Entity::Worker,
    "contactNumber",
    &worker.contact_number,
  )?;

  debug!(worker_id = %worker.worker_id, "worker inserted");
  Ok(worker)
}

pub fn update(conn: &Connection, id: Uuid, patch: WorkerPatch) -> Result<Worker> {
  let current = fetch(conn, id)?.ok_or_else(|| not_found(Entity::Worker, id))?;
  let id_str = encode_uuid(id);

  if let Some(contact) = &patch.contact_number {
    ensure_unique(
      conn,
      Entity::Worker,
      "contactNumber",
      CONTACT_TAKEN,
      contact,
      Some(id_str.as_str()),
    )?;
  }
  if let Some(ward) = patch.ward_id.as_set() {
    ensure_reference(conn, "wardId", Entity::Ward, encode_uuid(*ward))?;
  }

  let worker = Worker {
    worker_name: patch.worker_name.unwrap_or(current.worker_name),
    contact_number: patch.contact_number.unwrap_or(current.contact_number),
    ward_id: patch.ward_id.apply(current.ward_id),
    status: patch.status.unwrap_or(current.status),
    ..current
  };

  on_conflict(
    conn.execute(
      "UPDATE workers
          SET worker_name = ?2, contact_number = ?3, ward_id = ?4, status = ?5
        WHERE worker_id = ?1",
      params![
        id_str,
        worker.worker_name,
        worker.contact_number,
        worker.ward_id.map(encode_uuid),
        worker.status,
      ],
    ),
    Entity::Worker,
    "contactNumber",
    &worker.contact_number,
  )?;
  Ok(worker)
}

/// Wards this worker supervised and scans they recorded keep their rows with
/// the reference nulled out.
pub fn delete(conn: &Connection, id: Uuid) -> Result<()> {
  delete_by_id(conn, Entity::Worker, "DELETE FROM workers WHERE worker_id = ?1", id)
}
