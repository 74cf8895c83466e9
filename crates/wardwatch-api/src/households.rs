//! Handlers for `/households` endpoints.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use wardwatch_core::{
  envelope::{Envelope, ListEnvelope},
  household::{Household, HouseholdPatch, HouseholdRow, NewHousehold},
  query::HouseholdSort,
  store::WasteStore,
};

use crate::{
  error::ApiError,
  extract::{JsonBody, PathParam, QueryParams},
  params::ListParams,
  validate,
};

pub async fn list<S: WasteStore>(
  State(store): State<Arc<S>>,
  QueryParams(params): QueryParams<ListParams<HouseholdSort>>,
) -> Result<Json<ListEnvelope<HouseholdRow>>, ApiError> {
  let query = params.into_query()?;
  let page = store.list_households(&query).await.map_err(ApiError::from_store)?;
  Ok(Json(page.into()))
}

pub async fn get_one<S: WasteStore>(
  State(store): State<Arc<S>>,
  PathParam(id): PathParam<Uuid>,
) -> Result<Json<Envelope<HouseholdRow>>, ApiError> {
  let row = store
    .get_household(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("household not found: {id}")))?;
  Ok(Json(Envelope::data(row)))
}

pub async fn create<S: WasteStore>(
  State(store): State<Arc<S>>,
  JsonBody(body): JsonBody<NewHousehold>,
) -> Result<(StatusCode, Json<Envelope<Household>>), ApiError> {
  let input = validate::new_household(body)?;
  let household = store.add_household(input).await.map_err(ApiError::from_store)?;
  info!(house_id = %household.house_id, "household created");
  Ok((StatusCode::CREATED, Json(Envelope::data(household))))
}

pub async fn update<S: WasteStore>(
  State(store): State<Arc<S>>,
  PathParam(id): PathParam<Uuid>,
  JsonBody(patch): JsonBody<HouseholdPatch>,
) -> Result<Json<Envelope<Household>>, ApiError> {
  apply_update(&*store, id, patch).await
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBody {
  pub house_id: Uuid,
  #[serde(flatten)]
  pub patch:    HouseholdPatch,
}

pub async fn update_by_body<S: WasteStore>(
  State(store): State<Arc<S>>,
  JsonBody(body): JsonBody<UpdateBody>,
) -> Result<Json<Envelope<Household>>, ApiError> {
  apply_update(&*store, body.house_id, body.patch).await
}

async fn apply_update<S: WasteStore>(
  store: &S,
  id: Uuid,
  patch: HouseholdPatch,
) -> Result<Json<Envelope<Household>>, ApiError> {
  let patch = validate::household_patch(patch)?;
  let household = store
    .update_household(id, patch)
    .await
    .map_err(ApiError::from_store)?;
  info!(house_id = %id, "household updated");
  Ok(Json(Envelope::data(household)))
}

/// Scan logs and citizen reports for the household go with it.
pub async fn delete<S: WasteStore>(
  State(store): State<Arc<S>>,
  PathParam(id): PathParam<Uuid>,
) -> Result<Json<Envelope<()>>, ApiError> {
  store.delete_household(id).await.map_err(ApiError::from_store)?;
  info!(house_id = %id, "household deleted");
  Ok(Json(Envelope::message("Household deleted successfully")))
}
