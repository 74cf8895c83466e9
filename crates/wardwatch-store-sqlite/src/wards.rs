//! Ward queries, including the worker redistribution sweep.

use rand_core::{OsRng, RngCore as _};
use rusqlite::{Connection, OptionalExtension as _, params};
use tracing::debug;
use uuid::Uuid;
use wardwatch_core::{
  Entity,
  query::{Page, WardQuery, WardSort},
  ward::{NewWard, Ward, WardPatch, WardRow},
};

use crate::{
  Result,
  encode::{RawWard, RawWardRow, WARD_COLUMNS, encode_dt, encode_uuid, now},
  listing::{Listing, Predicate, into_page, order_by},
  store::{delete_by_id, ensure_reference, ensure_unique, not_found, on_conflict},
};

const FROM: &str = "wards wd LEFT JOIN workers sv ON sv.worker_id = wd.supervisor_id";

/// Workers assigned to the current `wd` row. Used both as a displayed column
/// and as the `workerCount` sort expression.
pub(crate) const WORKER_COUNT: &str =
  "(SELECT COUNT(*) FROM workers c WHERE c.ward_id = wd.ward_id)";

pub(crate) const HOUSEHOLD_COUNT: &str =
  "(SELECT COUNT(*) FROM households c WHERE c.ward_id = wd.ward_id)";

const NAME_TAKEN: &str =
  "SELECT 1 FROM wards WHERE ward_name = ?1 AND ward_id IS NOT ?2";

fn row_columns() -> String {
  format!("{WARD_COLUMNS}, sv.worker_name, {WORKER_COUNT}, {HOUSEHOLD_COUNT}")
}

fn sort_expr(key: WardSort) -> &'static str {
  match key {
    WardSort::WardId => "wd.ward_id",
    WardSort::WardName => "wd.ward_name",
    WardSort::SupervisorId => "wd.supervisor_id",
    WardSort::CreatedAt => "wd.created_at",
    WardSort::WorkerCount => WORKER_COUNT,
    WardSort::HouseholdCount => HOUSEHOLD_COUNT,
  }
}

pub fn list(conn: &Connection, query: &WardQuery) -> Result<Page<WardRow>> {
  let mut predicate = Predicate::new();
  if let Some(term) = query.filter.search_term() {
    predicate.any_contains(&["wd.ward_name", "sv.worker_name"], term);
  }
  predicate.created_within("wd.created_at", &query.filter.created);

  let listing = Listing {
    columns: row_columns(),
    from: FROM,
    predicate,
    order_by: order_by(sort_expr(query.sort_by), query.sort_order, "wd.ward_id"),
    page: query.page,
  };
  let (raw, total) = listing.run(conn, RawWardRow::read)?;
  into_page(raw, total, query.page, RawWardRow::into_row)
}

pub fn get(conn: &Connection, id: Uuid) -> Result<Option<WardRow>> {
  conn
    .query_row(
      &format!("SELECT {} FROM {FROM} WHERE wd.ward_id = ?1", row_columns()),
      [encode_uuid(id)],
      RawWardRow::read,
    )
    .optional()?
    .map(RawWardRow::into_row)
    .transpose()
}

fn fetch(conn: &Connection, id: Uuid) -> Result<Option<Ward>> {
  conn
    .query_row(
      &format!("SELECT {WARD_COLUMNS} FROM wards wd WHERE wd.ward_id = ?1"),
      [encode_uuid(id)],
      |r| RawWard::read(r, 0),
    )
    .optional()?
    .map(RawWard::into_ward)
    .transpose()
}

pub fn add(conn: &Connection, input: NewWard) -> Result<Ward> {
  ensure_unique(conn, Entity::Ward, "wardName", NAME_TAKEN, &input.ward_name, None)?;
  if let Some(supervisor) = input.supervisor_id {
    ensure_reference(conn, "supervisorId", Entity::Worker, encode_uuid(supervisor))?;
  }

  let ward = Ward {
    ward_id:       Uuid::new_v4(),
    ward_name:     input.ward_name,
    supervisor_id: input.supervisor_id,
    created_at:    now(),
  };

  on_conflict(
    conn.execute(
      "INSERT INTO wards (ward_id, ward_name, supervisor_id, created_at)
       VALUES (?1, ?2, ?3, ?4)",
      params![
        encode_uuid(ward.ward_id),
        ward.ward_name,
        ward.supervisor_id.map(encode_uuid),
        encode_dt(ward.created_at),
      ],
    ),
    Entity::Ward,
    "wardName",
    &ward.ward_name,
  )?;

  debug!(ward_id = %ward.ward_id, "ward inserted");
  Ok(ward)
}

pub fn update(conn: &Connection, id: Uuid, patch: WardPatch) -> Result<Ward> {
  let current = fetch(conn, id)?.ok_or_else(|| not_found(Entity::Ward, id))?;
  let id_str = encode_uuid(id);

  if let Some(name) = &patch.ward_name {
    ensure_unique(conn, Entity::Ward, "wardName", NAME_TAKEN, name, Some(id_str.as_str()))?;
  }
  if let Some(supervisor) = patch.supervisor_id.as_set() {
    ensure_reference(conn, "supervisorId", Entity::Worker, encode_uuid(*supervisor))?;
  }

  let ward = Ward {
    ward_name: patch.ward_name.unwrap_or(current.ward_name),
    supervisor_id: patch.supervisor_id.apply(current.supervisor_id),
    ..current
  };

  on_conflict(
    conn.execute(
      "UPDATE wards SET ward_name = ?2, supervisor_id = ?3 WHERE ward_id = ?1",
      params![id_str, ward.ward_name, ward.supervisor_id.map(encode_uuid)],
    ),
    Entity::Ward,
    "wardName",
    &ward.ward_name,
  )?;
  Ok(ward)
}

/// Workers and households in the ward are kept with a null ward by the
/// schema's `ON DELETE SET NULL`.
pub fn delete(conn: &Connection, id: Uuid) -> Result<()> {
  delete_by_id(conn, Entity::Ward, "DELETE FROM wards WHERE ward_id = ?1", id)
}

/// Point every worker at a uniformly chosen ward, one update per worker.
pub fn redistribute_workers(conn: &Connection) -> Result<u64> {
  let ward_ids = conn
    .prepare("SELECT ward_id FROM wards")?
    .query_map([], |r| r.get::<_, String>(0))?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  if ward_ids.is_empty() {
    return Err(wardwatch_core::Error::NoWards.into());
  }

  let worker_ids = conn
    .prepare("SELECT worker_id FROM workers")?
    .query_map([], |r| r.get::<_, String>(0))?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let mut assign = conn.prepare("UPDATE workers SET ward_id = ?2 WHERE worker_id = ?1")?;
  for worker_id in &worker_ids {
    let pick = pick_index(ward_ids.len());
    assign.execute(params![worker_id, ward_ids[pick]])?;
  }

  debug!(workers = worker_ids.len(), wards = ward_ids.len(), "workers redistributed");
  Ok(worker_ids.len() as u64)
}

/// Uniform index in `0..len`, rejecting draws from the biased tail of the
/// `u32` range. `len` must be non-zero.
fn pick_index(len: usize) -> usize {
  let len = len as u64;
  let zone = (u64::from(u32::MAX) + 1) / len * len;
  loop {
    let draw = u64::from(OsRng.next_u32());
    if draw < zone {
      return (draw % len) as usize;
    }
  }
}
