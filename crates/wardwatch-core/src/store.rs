//! The `WasteStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `wardwatch-store-sqlite`). The HTTP layer depends on this abstraction, not
//! on any concrete backend; the handle is constructed once at startup and
//! passed to every handler.

use std::future::Future;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  activity::{
    CitizenReport, NewCitizenReport, NewScanLog, NewTracker, ReportPatch,
    ScanLog, ScanLogRow, Tracker,
  },
  household::{Household, HouseholdPatch, HouseholdRow, NewHousehold},
  query::{HouseholdQuery, Page, ReportQuery, ScanLogQuery, WardQuery, WorkerQuery},
  ward::{NewWard, Ward, WardPatch, WardRow},
  worker::{NewWorker, Worker, WorkerPatch, WorkerRow},
};

/// Dashboard totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
  pub total_wards:      u64,
  pub total_workers:    u64,
  pub total_households: u64,
}

/// Lets callers recover a domain outcome (not found, conflict, …) from a
/// backend-specific error type.
pub trait DomainError {
  fn domain(&self) -> Option<&crate::Error>;
}

impl DomainError for crate::Error {
  fn domain(&self) -> Option<&crate::Error> { Some(self) }
}

/// Abstraction over a wardwatch storage backend.
///
/// Every mutation is a request-scoped check-then-write sequence with no
/// explicit transaction; dependent rows are handled by the schema's
/// foreign-key policy, never by pre-delete cleanup.
pub trait WasteStore: Send + Sync {
  type Error: DomainError + std::error::Error + Send + Sync + 'static;

  // ── Wards ─────────────────────────────────────────────────────────────

  /// Filtered, sorted, paginated wards with supervisor name and per-ward
  /// worker and household counts.
  fn list_wards<'a>(
    &'a self,
    query: &'a WardQuery,
  ) -> impl Future<Output = Result<Page<WardRow>, Self::Error>> + Send + 'a;

  fn get_ward(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<WardRow>, Self::Error>> + Send + '_;

  /// Rejects a duplicate ward name and an unknown supervisor.
  fn add_ward(
    &self,
    input: NewWard,
  ) -> impl Future<Output = Result<Ward, Self::Error>> + Send + '_;

  fn update_ward(
    &self,
    id: Uuid,
    patch: WardPatch,
  ) -> impl Future<Output = Result<Ward, Self::Error>> + Send + '_;

  /// Hard delete. Workers and households in the ward keep their rows with a
  /// null ward.
  fn delete_ward(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Workers ───────────────────────────────────────────────────────────

  fn list_workers<'a>(
    &'a self,
    query: &'a WorkerQuery,
  ) -> impl Future<Output = Result<Page<WorkerRow>, Self::Error>> + Send + 'a;

  fn get_worker(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<WorkerRow>, Self::Error>> + Send + '_;

  /// Rejects a contact number already held by another worker.
  fn add_worker(
    &self,
    input: NewWorker,
  ) -> impl Future<Output = Result<Worker, Self::Error>> + Send + '_;

  fn update_worker(
    &self,
    id: Uuid,
    patch: WorkerPatch,
  ) -> impl Future<Output = Result<Worker, Self::Error>> + Send + '_;

  fn delete_worker(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Households ────────────────────────────────────────────────────────

  fn list_households<'a>(
    &'a self,
    query: &'a HouseholdQuery,
  ) -> impl Future<Output = Result<Page<HouseholdRow>, Self::Error>> + Send + 'a;

  fn get_household(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<HouseholdRow>, Self::Error>> + Send + '_;

  fn add_household(
    &self,
    input: NewHousehold,
  ) -> impl Future<Output = Result<Household, Self::Error>> + Send + '_;

  /// Always refreshes `date_updated`.
  fn update_household(
    &self,
    id: Uuid,
    patch: HouseholdPatch,
  ) -> impl Future<Output = Result<Household, Self::Error>> + Send + '_;

  /// Hard delete; scan logs and citizen reports cascade away.
  fn delete_household(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Dashboard ─────────────────────────────────────────────────────────

  fn stats(&self) -> impl Future<Output = Result<Stats, Self::Error>> + Send + '_;

  /// Assign every worker to a randomly chosen existing ward, one row at a
  /// time. Returns the number of workers reassigned.
  fn redistribute_workers(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Field activity ────────────────────────────────────────────────────

  fn add_tracker(
    &self,
    input: NewTracker,
  ) -> impl Future<Output = Result<Tracker, Self::Error>> + Send + '_;

  fn record_scan(
    &self,
    input: NewScanLog,
  ) -> impl Future<Output = Result<ScanLog, Self::Error>> + Send + '_;

  fn list_scans<'a>(
    &'a self,
    query: &'a ScanLogQuery,
  ) -> impl Future<Output = Result<Page<ScanLogRow>, Self::Error>> + Send + 'a;

  fn file_report(
    &self,
    input: NewCitizenReport,
  ) -> impl Future<Output = Result<CitizenReport, Self::Error>> + Send + '_;

  fn list_reports<'a>(
    &'a self,
    query: &'a ReportQuery,
  ) -> impl Future<Output = Result<Page<CitizenReport>, Self::Error>> + Send + 'a;

  fn update_report(
    &self,
    id: Uuid,
    patch: ReportPatch,
  ) -> impl Future<Output = Result<CitizenReport, Self::Error>> + Send + '_;
}
