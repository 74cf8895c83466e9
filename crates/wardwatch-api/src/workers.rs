//! Handlers for `/workers` endpoints. Same shape as the ward routes; the
//! listing additionally filters by ward name (`?ward=`).

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use wardwatch_core::{
  envelope::{Envelope, ListEnvelope},
  query::WorkerSort,
  store::WasteStore,
  worker::{NewWorker, Worker, WorkerPatch, WorkerRow},
};

use crate::{
  error::ApiError,
  extract::{JsonBody, PathParam, QueryParams},
  params::ListParams,
  validate,
};

pub async fn list<S: WasteStore>(
  State(store): State<Arc<S>>,
  QueryParams(params): QueryParams<ListParams<WorkerSort>>,
) -> Result<Json<ListEnvelope<WorkerRow>>, ApiError> {
  let query = params.into_query()?;
  let page = store.list_workers(&query).await.map_err(ApiError::from_store)?;
  Ok(Json(page.into()))
}

pub async fn get_one<S: WasteStore>(
  State(store): State<Arc<S>>,
  PathParam(id): PathParam<Uuid>,
) -> Result<Json<Envelope<WorkerRow>>, ApiError> {
  let row = store
    .get_worker(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("worker not found: {id}")))?;
  Ok(Json(Envelope::data(row)))
}

/// 409 when the contact number is already held by another worker.
pub async fn create<S: WasteStore>(
  State(store): State<Arc<S>>,
  JsonBody(body): JsonBody<NewWorker>,
) -> Result<(StatusCode, Json<Envelope<Worker>>), ApiError> {
  let input = validate::new_worker(body)?;
  let worker = store.add_worker(input).await.map_err(ApiError::from_store)?;
  info!(worker_id = %worker.worker_id, "worker created");
  Ok((StatusCode::CREATED, Json(Envelope::data(worker))))
}

pub async fn update<S: WasteStore>(
  State(store): State<Arc<S>>,
  PathParam(id): PathParam<Uuid>,
  JsonBody(patch): JsonBody<WorkerPatch>,
) -> Result<Json<Envelope<Worker>>, ApiError> {
  apply_update(&*store, id, patch).await
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBody {
  pub worker_id: Uuid,
  #[serde(flatten)]
  pub patch:     WorkerPatch,
}

pub async fn update_by_body<S: WasteStore>(
  State(store): State<Arc<S>>,
  JsonBody(body): JsonBody<UpdateBody>,
) -> Result<Json<Envelope<Worker>>, ApiError> {
  apply_update(&*store, body.worker_id, body.patch).await
}

async fn apply_update<S: WasteStore>(
  store: &S,
  id: Uuid,
  patch: WorkerPatch,
) -> Result<Json<Envelope<Worker>>, ApiError> {
  let patch = validate::worker_patch(patch)?;
  let worker = store.update_worker(id, patch).await.map_err(ApiError::from_store)?;
  info!(worker_id = %id, "worker updated");
  Ok(Json(Envelope::data(worker)))
}

pub async fn delete<S: WasteStore>(
  State(store): State<Arc<S>>,
  PathParam(id): PathParam<Uuid>,
) -> Result<Json<Envelope<()>>, ApiError> {
  store.delete_worker(id).await.map_err(ApiError::from_store)?;
  info!(worker_id = %id, "worker deleted");
  Ok(Json(Envelope::message("Worker deleted successfully")))
}
