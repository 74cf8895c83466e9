//! `GET /stats` and the unauthenticated `GET /health`.

use std::sync::Arc;

use axum::{Json, extract::State};
use wardwatch_core::{
  envelope::{Envelope, Health},
  store::{Stats, WasteStore},
};

use crate::error::ApiError;

pub async fn stats<S: WasteStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Envelope<Stats>>, ApiError> {
  let stats = store.stats().await.map_err(ApiError::from_store)?;
  Ok(Json(Envelope::data(stats)))
}

pub async fn health() -> Json<Health> {
  Json(Health {
    status:  "ok".into(),
    version: env!("CARGO_PKG_VERSION").into(),
  })
}
