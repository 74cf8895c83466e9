//! [`SqliteStore`]: the SQLite implementation of [`WasteStore`].

use std::path::Path;

use rusqlite::{Connection, OptionalExtension as _, ToSql};
use uuid::Uuid;
use wardwatch_core::{
  Entity,
  activity::{
    CitizenReport, NewCitizenReport, NewScanLog, NewTracker, ReportPatch,
    ScanLog, ScanLogRow, Tracker,
  },
  household::{Household, HouseholdPatch, HouseholdRow, NewHousehold},
  query::{HouseholdQuery, Page, ReportQuery, ScanLogQuery, WardQuery, WorkerQuery},
  store::{Stats, WasteStore},
  ward::{NewWard, Ward, WardPatch, WardRow},
  worker::{NewWorker, Worker, WorkerPatch, WorkerRow},
};

use crate::{
  Error, Result, activity, error::is_unique_violation, households, listing,
  schema::SCHEMA, wards, workers,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A wardwatch store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Flush and close the connection. Other clones of this store stop working
  /// once this returns.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        listing::register_functions(conn)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `f` on the connection thread. Domain errors raised inside `f` come
  /// back unchanged; only the transport failure is wrapped.
  async fn with_conn<T, F>(&self, f: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&Connection) -> Result<T> + Send + 'static,
  {
    self.conn.call(move |conn| Ok(f(conn))).await?
  }
}

// ─── Shared checks ───────────────────────────────────────────────────────────
//
// Every mutation checks before it writes. There is no surrounding
// transaction, so a concurrent writer can still slip in between; SQLite's
// own constraints catch that and [`on_conflict`] reports it the same way.

fn key_lookup(entity: Entity) -> &'static str {
  match entity {
    Entity::Ward => "SELECT 1 FROM wards WHERE ward_id = ?1",
    Entity::Worker => "SELECT 1 FROM workers WHERE worker_id = ?1",
    Entity::Household => "SELECT 1 FROM households WHERE house_id = ?1",
    Entity::Tracker => "SELECT 1 FROM trackers WHERE tracker_id = ?1",
    Entity::ScanLog => "SELECT 1 FROM scan_logs WHERE scan_id = ?1",
    Entity::CitizenReport => "SELECT 1 FROM citizen_reports WHERE report_id = ?1",
  }
}

fn row_exists(conn: &Connection, entity: Entity, key: &dyn ToSql) -> Result<bool> {
  Ok(
    conn
      .query_row(key_lookup(entity), [key], |_| Ok(()))
      .optional()?
      .is_some(),
  )
}

/// Fail with `MissingReference` unless a `target` row keyed by `key` exists.
pub(crate) fn ensure_reference<K>(
  conn: &Connection,
  field: &'static str,
  target: Entity,
  key: K,
) -> Result<()>
where
  K: ToSql + std::fmt::Display,
{
  if row_exists(conn, target, &key)? {
    Ok(())
  } else {
    Err(
      wardwatch_core::Error::MissingReference { field, target, id: key.to_string() }
        .into(),
    )
  }
}

/// Fail with `Conflict` if `sql` (taking the value as `?1` and the row being
/// updated, if any, as `?2`) finds a row.
pub(crate) fn ensure_unique(
  conn: &Connection,
  entity: Entity,
  field: &'static str,
  sql: &str,
  value: &str,
  except: Option<&str>,
) -> Result<()> {
  let taken = conn
    .query_row(sql, rusqlite::params![value, except], |_| Ok(()))
    .optional()?
    .is_some();
  if taken {
    return Err(conflict(entity, field, value));
  }
  Ok(())
}

/// Translate a UNIQUE violation from a write into a `Conflict`.
pub(crate) fn on_conflict<T>(
  result: rusqlite::Result<T>,
  entity: Entity,
  field: &'static str,
  value: &str,
) -> Result<T> {
  result.map_err(|e| {
    if is_unique_violation(&e) {
      conflict(entity, field, value)
    } else {
      e.into()
    }
  })
}

fn conflict(entity: Entity, field: &'static str, value: &str) -> Error {
  wardwatch_core::Error::Conflict { entity, field, value: value.to_owned() }.into()
}

pub(crate) fn not_found(entity: Entity, id: Uuid) -> Error {
  wardwatch_core::Error::NotFound { entity, id }.into()
}

/// Run a `DELETE … WHERE key = ?1` and report `NotFound` when nothing went.
pub(crate) fn delete_by_id(
  conn: &Connection,
  entity: Entity,
  sql: &str,
  id: Uuid,
) -> Result<()> {
  let removed = conn.execute(sql, [crate::encode::encode_uuid(id)])?;
  if removed == 0 {
    return Err(not_found(entity, id));
  }
  Ok(())
}

// ─── WasteStore impl ─────────────────────────────────────────────────────────

impl WasteStore for SqliteStore {
  type Error = Error;

  // ── Wards ─────────────────────────────────────────────────────────────────

  async fn list_wards<'a>(&'a self, query: &'a WardQuery) -> Result<Page<WardRow>> {
    let query = query.clone();
    self.with_conn(move |conn| wards::list(conn, &query)).await
  }

  async fn get_ward(&self, id: Uuid) -> Result<Option<WardRow>> {
    self.with_conn(move |conn| wards::get(conn, id)).await
  }

  async fn add_ward(&self, input: NewWard) -> Result<Ward> {
    self.with_conn(move |conn| wards::add(conn, input)).await
  }

  async fn update_ward(&self, id: Uuid, patch: WardPatch) -> Result<Ward> {
    self.with_conn(move |conn| wards::update(conn, id, patch)).await
  }

  async fn delete_ward(&self, id: Uuid) -> Result<()> {
    self.with_conn(move |conn| wards::delete(conn, id)).await
  }

  // ── Workers ───────────────────────────────────────────────────────────────

  async fn list_workers<'a>(
    &'a self,
    query: &'a WorkerQuery,
  ) -> Result<Page<WorkerRow>> {
    let query = query.clone();
    self.with_conn(move |conn| workers::list(conn, &query)).await
  }

  async fn get_worker(&self, id: Uuid) -> Result<Option<WorkerRow>> {
    self.with_conn(move |conn| workers::get(conn, id)).await
  }

  async fn add_worker(&self, input: NewWorker) -> Result<Worker> {
    self.with_conn(move |conn| workers::add(conn, input)).await
  }

  async fn update_worker(&self, id: Uuid, patch: WorkerPatch) -> Result<Worker> {
    self.with_conn(move |conn| workers::update(conn, id, patch)).await
  }

  async fn delete_worker(&self, id: Uuid) -> Result<()> {
    self.with_conn(move |conn| workers::delete(conn, id)).await
  }

  // ── Households ────────────────────────────────────────────────────────────

  async fn list_households<'a>(
    &'a self,
    query: &'a HouseholdQuery,
  ) -> Result<Page<HouseholdRow>> {
    let query = query.clone();
    self.with_conn(move |conn| households::list(conn, &query)).await
  }

  async fn get_household(&self, id: Uuid) -> Result<Option<HouseholdRow>> {
    self.with_conn(move |conn| households::get(conn, id)).await
  }

  async fn add_household(&self, input: NewHousehold) -> Result<Household> {
    self.with_conn(move |conn| households::add(conn, input)).await
  }

  async fn update_household(
    &self,
    id: Uuid,
    patch: HouseholdPatch,
  ) -> Result<Household> {
    self
      .with_conn(move |conn| households::update(conn, id, patch))
      .await
  }

  async fn delete_household(&self, id: Uuid) -> Result<()> {
    self.with_conn(move |conn| households::delete(conn, id)).await
  }

  // ── Dashboard ─────────────────────────────────────────────────────────────

  async fn stats(&self) -> Result<Stats> {
    self
      .with_conn(|conn| {
        let count = |table: &str| -> Result<u64> {
          let n: i64 =
            conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))?;
          Ok(n.max(0) as u64)
        };
        Ok(Stats {
          total_wards:      count("wards")?,
          total_workers:    count("workers")?,
          total_households: count("households")?,
        })
      })
      .await
  }

  async fn redistribute_workers(&self) -> Result<u64> {
    self.with_conn(wards::redistribute_workers).await
  }

  // ── Field activity ────────────────────────────────────────────────────────

  async fn add_tracker(&self, input: NewTracker) -> Result<Tracker> {
    self.with_conn(move |conn| activity::add_tracker(conn, input)).await
  }

  async fn record_scan(&self, input: NewScanLog) -> Result<ScanLog> {
    self.with_conn(move |conn| activity::record_scan(conn, input)).await
  }

  async fn list_scans<'a>(
    &'a self,
    query: &'a ScanLogQuery,
  ) -> Result<Page<ScanLogRow>> {
    let query = query.clone();
    self.with_conn(move |conn| activity::list_scans(conn, &query)).await
  }

  async fn file_report(&self, input: NewCitizenReport) -> Result<CitizenReport> {
    self.with_conn(move |conn| activity::file_report(conn, input)).await
  }

  async fn list_reports<'a>(
    &'a self,
    query: &'a ReportQuery,
  ) -> Result<Page<CitizenReport>> {
    let query = query.clone();
    self.with_conn(move |conn| activity::list_reports(conn, &query)).await
  }

  async fn update_report(
    &self,
    id: Uuid,
    patch: ReportPatch,
  ) -> Result<CitizenReport> {
    self
      .with_conn(move |conn| activity::update_report(conn, id, patch))
      .await
  }
}
