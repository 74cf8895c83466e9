//! Handlers for field activity: `/trackers`, `/scan-logs` and
//! `/citizen-reports`.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use tracing::info;
use uuid::Uuid;
use wardwatch_core::{
  activity::{
    CitizenReport, NewCitizenReport, NewScanLog, NewTracker, ReportPatch, ScanLog,
    ScanLogRow, Tracker,
  },
  envelope::{Envelope, ListEnvelope},
  store::WasteStore,
};

use crate::{
  error::ApiError,
  extract::{JsonBody, PathParam, QueryParams},
  params::{ReportParams, ScanParams},
  validate,
};

// ─── Trackers ────────────────────────────────────────────────────────────────

/// `POST /trackers/add`, body: `{"method":"nfc","houseId":null}`
pub async fn add_tracker<S: WasteStore>(
  State(store): State<Arc<S>>,
  JsonBody(body): JsonBody<NewTracker>,
) -> Result<(StatusCode, Json<Envelope<Tracker>>), ApiError> {
  let tracker = store.add_tracker(body).await.map_err(ApiError::from_store)?;
  info!(tracker_id = tracker.tracker_id, "tracker registered");
  Ok((StatusCode::CREATED, Json(Envelope::data(tracker))))
}

// ─── Scan logs ───────────────────────────────────────────────────────────────

/// `GET /scan-logs[?house_id=&worker_id=&method=&synced=&page=&limit=]`
pub async fn list_scans<S: WasteStore>(
  State(store): State<Arc<S>>,
  QueryParams(params): QueryParams<ScanParams>,
) -> Result<Json<ListEnvelope<ScanLogRow>>, ApiError> {
  let query = params.into_query()?;
  let page = store.list_scans(&query).await.map_err(ApiError::from_store)?;
  Ok(Json(page.into()))
}

/// `POST /scan-logs/add`
pub async fn record_scan<S: WasteStore>(
  State(store): State<Arc<S>>,
  JsonBody(body): JsonBody<NewScanLog>,
) -> Result<(StatusCode, Json<Envelope<ScanLog>>), ApiError> {
  let input = validate::new_scan(body)?;
  let scan = store.record_scan(input).await.map_err(ApiError::from_store)?;
  info!(scan_id = %scan.scan_id, house_id = %scan.house_id, "scan recorded");
  Ok((StatusCode::CREATED, Json(Envelope::data(scan))))
}

// ─── Citizen reports ─────────────────────────────────────────────────────────

/// `GET /citizen-reports[?search=&status=&priority=&page=&limit=]`
pub async fn list_reports<S: WasteStore>(
  State(store): State<Arc<S>>,
  QueryParams(params): QueryParams<ReportParams>,
) -> Result<Json<ListEnvelope<CitizenReport>>, ApiError> {
  let query = params.into_query()?;
  let page = store.list_reports(&query).await.map_err(ApiError::from_store)?;
  Ok(Json(page.into()))
}

/// `POST /citizen-reports/add`
pub async fn file_report<S: WasteStore>(
  State(store): State<Arc<S>>,
  JsonBody(body): JsonBody<NewCitizenReport>,
) -> Result<(StatusCode, Json<Envelope<CitizenReport>>), ApiError> {
  let input = validate::new_report(body)?;
  let report = store.file_report(input).await.map_err(ApiError::from_store)?;
  info!(report_id = %report.report_id, "citizen report filed");
  Ok((StatusCode::CREATED, Json(Envelope::data(report))))
}

/// `PUT /citizen-reports/{id}`
pub async fn update_report<S: WasteStore>(
  State(store): State<Arc<S>>,
  PathParam(id): PathParam<Uuid>,
  JsonBody(patch): JsonBody<ReportPatch>,
) -> Result<Json<Envelope<CitizenReport>>, ApiError> {
  let patch = validate::report_patch(patch)?;
  let report = store.update_report(id, patch).await.map_err(ApiError::from_store)?;
  info!(report_id = %id, "citizen report updated");
  Ok(Json(Envelope::data(report)))
}
