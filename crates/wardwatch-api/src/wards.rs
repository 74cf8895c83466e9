//! Handlers for `/wards` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/wards` | Filtered, sorted, paginated listing |
//! | `GET`    | `/wards/{id}` | 404 if not found |
//! | `POST`   | `/wards/add` | 201; 409 on duplicate name |
//! | `PUT`    | `/wards/{id}` | Sparse update |
//! | `POST`   | `/wards/update` | Sparse update, id in body as `wardId` |
//! | `DELETE` | `/wards/{id}` | 404 if not found |
//! | `POST`   | `/wards/redistribute-workers` | 409 if there are no wards |

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use wardwatch_core::{
  envelope::{Envelope, ListEnvelope, Redistribution},
  query::WardSort,
  store::WasteStore,
  ward::{NewWard, Ward, WardPatch, WardRow},
};

use crate::{
  error::ApiError,
  extract::{JsonBody, PathParam, QueryParams},
  params::ListParams,
  validate,
};

/// `GET /wards`
pub async fn list<S: WasteStore>(
  State(store): State<Arc<S>>,
  QueryParams(params): QueryParams<ListParams<WardSort>>,
) -> Result<Json<ListEnvelope<WardRow>>, ApiError> {
  let query = params.into_query()?;
  let page = store.list_wards(&query).await.map_err(ApiError::from_store)?;
  Ok(Json(page.into()))
}

/// `GET /wards/{id}`
pub async fn get_one<S: WasteStore>(
  State(store): State<Arc<S>>,
  PathParam(id): PathParam<Uuid>,
) -> Result<Json<Envelope<WardRow>>, ApiError> {
  let row = store
    .get_ward(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("ward not found: {id}")))?;
  Ok(Json(Envelope::data(row)))
}

/// `POST /wards/add`, body: `{"wardName":"East Ward","supervisorId":null}`
pub async fn create<S: WasteStore>(
  State(store): State<Arc<S>>,
  JsonBody(body): JsonBody<NewWard>,
) -> Result<(StatusCode, Json<Envelope<Ward>>), ApiError> {
  let input = validate::new_ward(body)?;
  let ward = store.add_ward(input).await.map_err(ApiError::from_store)?;
  info!(ward_id = %ward.ward_id, ward_name = %ward.ward_name, "ward created");
  Ok((StatusCode::CREATED, Json(Envelope::data(ward))))
}

/// `PUT /wards/{id}`
pub async fn update<S: WasteStore>(
  State(store): State<Arc<S>>,
  PathParam(id): PathParam<Uuid>,
  JsonBody(patch): JsonBody<WardPatch>,
) -> Result<Json<Envelope<Ward>>, ApiError> {
  apply_update(&*store, id, patch).await
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBody {
  pub ward_id: Uuid,
  #[serde(flatten)]
  pub patch:   WardPatch,
}

/// `POST /wards/update`
pub async fn update_by_body<S: WasteStore>(
  State(store): State<Arc<S>>,
  JsonBody(body): JsonBody<UpdateBody>,
) -> Result<Json<Envelope<Ward>>, ApiError> {
  apply_update(&*store, body.ward_id, body.patch).await
}

async fn apply_update<S: WasteStore>(
  store: &S,
  id: Uuid,
  patch: WardPatch,
) -> Result<Json<Envelope<Ward>>, ApiError> {
  let patch = validate::ward_patch(patch)?;
  let ward = store.update_ward(id, patch).await.map_err(ApiError::from_store)?;
  info!(ward_id = %id, "ward updated");
  Ok(Json(Envelope::data(ward)))
}

/// `DELETE /wards/{id}`
pub async fn delete<S: WasteStore>(
  State(store): State<Arc<S>>,
  PathParam(id): PathParam<Uuid>,
) -> Result<Json<Envelope<()>>, ApiError> {
  store.delete_ward(id).await.map_err(ApiError::from_store)?;
  info!(ward_id = %id, "ward deleted");
  Ok(Json(Envelope::message("Ward deleted successfully")))
}

/// `POST /wards/redistribute-workers`
pub async fn redistribute<S: WasteStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Envelope<Redistribution>>, ApiError> {
  let workers_reassigned =
    store.redistribute_workers().await.map_err(ApiError::from_store)?;
  info!(workers_reassigned, "workers redistributed across wards");
  Ok(Json(Envelope::data(Redistribution { workers_reassigned })))
}
