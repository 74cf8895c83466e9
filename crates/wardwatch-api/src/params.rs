//! Query-string parameters for the listing endpoints.
//!
//! Sort keys deserialize straight into the per-entity allow-list enums, so
//! an unknown `sort_by` is rejected before a handler runs.

use serde::Deserialize;
use uuid::Uuid;
use wardwatch_core::{
  activity::{ReportPriority, ReportStatus, ScanMethod},
  query::{
    DEFAULT_LIMIT, DateRange, ListFilter, ListQuery, PageRequest, ReportQuery,
    ScanLogQuery, SortOrder, non_blank,
  },
};

use crate::error::ApiError;

fn page_request(page: Option<u32>, limit: Option<u32>) -> Result<PageRequest, ApiError> {
  Ok(PageRequest::new(page.unwrap_or(1), limit.unwrap_or(DEFAULT_LIMIT))?)
}

/// `?search=&ward=&from_date=&to_date=&sort_by=&sort_order=&page=&limit=`
#[derive(Debug, Deserialize)]
pub struct ListParams<K> {
  pub search:     Option<String>,
  /// Ward-name substring; ignored by the ward listing itself.
  pub ward:       Option<String>,
  pub from_date:  Option<String>,
  pub to_date:    Option<String>,
  pub sort_by:    Option<K>,
  pub sort_order: Option<SortOrder>,
  pub page:       Option<u32>,
  pub limit:      Option<u32>,
}

impl<K: Default> ListParams<K> {
  pub fn into_query(self) -> Result<ListQuery<K>, ApiError> {
    let created = DateRange::parse(self.from_date.as_deref(), self.to_date.as_deref())?;
    Ok(ListQuery {
      filter:     ListFilter {
        search: non_blank(self.search.as_deref()).map(str::to_owned),
        ward: non_blank(self.ward.as_deref()).map(str::to_owned),
        created,
      },
      sort_by:    self.sort_by.unwrap_or_default(),
      sort_order: self.sort_order.unwrap_or_default(),
      page:       page_request(self.page, self.limit)?,
    })
  }
}

/// `?house_id=&worker_id=&method=&synced=&page=&limit=`
#[derive(Debug, Default, Deserialize)]
pub struct ScanParams {
  pub house_id:  Option<Uuid>,
  pub worker_id: Option<Uuid>,
  pub method:    Option<ScanMethod>,
  pub synced:    Option<bool>,
  pub page:      Option<u32>,
  pub limit:     Option<u32>,
}

impl ScanParams {
  pub fn into_query(self) -> Result<ScanLogQuery, ApiError> {
    Ok(ScanLogQuery {
      house_id:  self.house_id,
      worker_id: self.worker_id,
      method:    self.method,
      synced:    self.synced,
      page:      page_request(self.page, self.limit)?,
    })
  }
}

/// `?search=&status=&priority=&page=&limit=`
#[derive(Debug, Default, Deserialize)]
pub struct ReportParams {
  pub search:   Option<String>,
  pub status:   Option<ReportStatus>,
  pub priority: Option<ReportPriority>,
  pub page:     Option<u32>,
  pub limit:    Option<u32>,
}

impl ReportParams {
  pub fn into_query(self) -> Result<ReportQuery, ApiError> {
    Ok(ReportQuery {
      search:   non_blank(self.search.as_deref()).map(str::to_owned),
      status:   self.status,
      priority: self.priority,
      page:     page_request(self.page, self.limit)?,
    })
  }
}
