//! JSON REST API for wardwatch.
//!
//! Exposes an axum [`Router`] backed by any [`wardwatch_core::store::WasteStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let api = wardwatch_api::api_router(store.clone())
//!   .route_layer(auth_layer)
//!   .merge(wardwatch_api::health_router());
//! Router::new().nest("/api", api)
//! ```

pub mod activity;
pub mod dashboard;
pub mod error;
pub mod extract;
pub mod households;
pub mod params;
pub mod validate;
pub mod wards;
pub mod workers;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use wardwatch_core::store::WasteStore;

pub use error::ApiError;

/// Build the API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: WasteStore + 'static,
{
  Router::new()
    // Wards
    .route("/wards", get(wards::list::<S>))
    .route("/wards/add", post(wards::create::<S>))
    .route("/wards/update", post(wards::update_by_body::<S>))
    .route("/wards/redistribute-workers", post(wards::redistribute::<S>))
    .route(
      "/wards/{id}",
      get(wards::get_one::<S>)
        .put(wards::update::<S>)
        .delete(wards::delete::<S>),
    )
    // Workers
    .route("/workers", get(workers::list::<S>))
    .route("/workers/add", post(workers::create::<S>))
    .route("/workers/update", post(workers::update_by_body::<S>))
    .route(
      "/workers/{id}",
      get(workers::get_one::<S>)
        .put(workers::update::<S>)
        .delete(workers::delete::<S>),
    )
    // Households
    .route("/households", get(households::list::<S>))
    .route("/households/add", post(households::create::<S>))
    .route("/households/update", post(households::update_by_body::<S>))
    .route(
      "/households/{id}",
      get(households::get_one::<S>)
        .put(households::update::<S>)
        .delete(households::delete::<S>),
    )
    // Field activity
    .route("/trackers/add", post(activity::add_tracker::<S>))
    .route("/scan-logs", get(activity::list_scans::<S>))
    .route("/scan-logs/add", post(activity::record_scan::<S>))
    .route("/citizen-reports", get(activity::list_reports::<S>))
    .route("/citizen-reports/add", post(activity::file_report::<S>))
    .route("/citizen-reports/{id}", put(activity::update_report::<S>))
    // Dashboard
    .route("/stats", get(dashboard::stats::<S>))
    .with_state(store)
}

/// `GET /health`, kept apart so callers can mount it outside their auth
/// layer.
pub fn health_router() -> Router<()> {
  Router::new().route("/health", get(dashboard::health))
}

#[cfg(test)]
mod tests;
