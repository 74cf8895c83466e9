//! Listing parameters and the paginated result envelope.
//!
//! The three entity listings share one shape: a conjunctive filter set, a
//! sort key drawn from a per-entity allow-list, and a page request. Sort keys
//! are closed enums, so an arbitrary column name can never reach a backend.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  activity::{ReportPriority, ReportStatus, ScanMethod},
};

pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

// ─── Sorting ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
  Asc,
  #[default]
  Desc,
}

/// Sortable ward columns. `WorkerCount` and `HouseholdCount` are computed per
/// row, not stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WardSort {
  WardId,
  WardName,
  SupervisorId,
  #[default]
  CreatedAt,
  WorkerCount,
  HouseholdCount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WorkerSort {
  WorkerId,
  WorkerName,
  ContactNumber,
  WardId,
  #[default]
  DateCreated,
  Status,
  WardName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HouseholdSort {
  HouseId,
  OwnerNumber,
  Address,
  WardId,
  #[default]
  DateCreated,
  DateUpdated,
  Status,
  WardName,
}

// ─── Filters ─────────────────────────────────────────────────────────────────

/// An optional bound pair applied to an entity's creation timestamp.
///
/// Both bounds → inclusive range; one bound → one-sided inequality; none → no
/// predicate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
  pub from: Option<DateTime<Utc>>,
  pub to:   Option<DateTime<Utc>>,
}

impl DateRange {
  /// Parse both bounds. Blank strings count as "not supplied".
  pub fn parse(from: Option<&str>, to: Option<&str>) -> Result<Self> {
    Ok(Self {
      from: parse_bound("from_date", from)?,
      to:   parse_bound("to_date", to)?,
    })
  }

  pub fn is_unbounded(&self) -> bool { self.from.is_none() && self.to.is_none() }
}

/// Accepts RFC 3339 or a bare `YYYY-MM-DD`, which means midnight UTC.
fn parse_bound(
  field: &'static str,
  raw: Option<&str>,
) -> Result<Option<DateTime<Utc>>> {
  let Some(raw) = non_blank(raw) else {
    return Ok(None);
  };

  if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
    return Ok(Some(dt.with_timezone(&Utc)));
  }

  NaiveDate::parse_from_str(raw, "%Y-%m-%d")
    .ok()
    .and_then(|d| d.and_hms_opt(0, 0, 0))
    .map(|naive| Some(naive.and_utc()))
    .ok_or_else(|| Error::InvalidValue {
      field,
      message: format!("{raw:?} is not a date (YYYY-MM-DD) or RFC 3339 timestamp"),
    })
}

/// Trimmed value, or `None` when missing or blank.
pub fn non_blank(raw: Option<&str>) -> Option<&str> {
  raw.map(str::trim).filter(|s| !s.is_empty())
}

/// Filters shared by the ward, worker and household listings. All supplied
/// filters are combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
  /// Case-insensitive substring matched against any of the entity's search
  /// columns.
  pub search:  Option<String>,
  /// Case-insensitive substring of the joined ward's name.
  pub ward:    Option<String>,
  pub created: DateRange,
}

impl ListFilter {
  pub fn search_term(&self) -> Option<&str> { non_blank(self.search.as_deref()) }

  pub fn ward_term(&self) -> Option<&str> { non_blank(self.ward.as_deref()) }
}

// ─── Paging ──────────────────────────────────────────────────────────────────

/// A 1-based page number and a page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
  page:  u32,
  limit: u32,
}

impl Default for PageRequest {
  fn default() -> Self { Self { page: 1, limit: DEFAULT_LIMIT } }
}

impl PageRequest {
  pub fn new(page: u32, limit: u32) -> Result<Self> {
    if page == 0 {
      return Err(Error::InvalidValue {
        field:   "page",
        message: "must be at least 1".into(),
      });
    }
    if limit == 0 || limit > MAX_LIMIT {
      return Err(Error::InvalidValue {
        field:   "limit",
        message: format!("must be between 1 and {MAX_LIMIT}"),
      });
    }
    Ok(Self { page, limit })
  }

  pub fn page(&self) -> u32 { self.page }

  pub fn limit(&self) -> u32 { self.limit }

  /// `(page - 1) * limit`
  pub fn offset(&self) -> u64 { u64::from(self.page - 1) * u64::from(self.limit) }
}

/// Pagination summary returned alongside every listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
  pub page:        u32,
  pub limit:       u32,
  pub total_pages: u64,
  pub total_items: u64,
}

impl Pagination {
  pub fn new(request: PageRequest, total_items: u64) -> Self {
    Self {
      page: request.page,
      limit: request.limit,
      total_pages: total_items.div_ceil(u64::from(request.limit)),
      total_items,
    }
  }
}

/// One page of rows plus the summary of the full filtered set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
  pub items:      Vec<T>,
  pub pagination: Pagination,
}

// ─── Query types ─────────────────────────────────────────────────────────────

/// Parameters for the ward, worker and household listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery<K> {
  pub filter:     ListFilter,
  pub sort_by:    K,
  pub sort_order: SortOrder,
  pub page:       PageRequest,
}

pub type WardQuery = ListQuery<WardSort>;
pub type WorkerQuery = ListQuery<WorkerSort>;
pub type HouseholdQuery = ListQuery<HouseholdSort>;

/// Parameters for [`crate::store::WasteStore::list_scans`]. Newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanLogQuery {
  pub house_id:  Option<Uuid>,
  pub worker_id: Option<Uuid>,
  pub method:    Option<ScanMethod>,
  pub synced:    Option<bool>,
  pub page:      PageRequest,
}

/// Parameters for [`crate::store::WasteStore::list_reports`]. Newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportQuery {
  /// Matched against the citizen contact and the notes.
  pub search:   Option<String>,
  pub status:   Option<ReportStatus>,
  pub priority: Option<ReportPriority>,
  pub page:     PageRequest,
}
