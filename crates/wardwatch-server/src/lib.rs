//! HTTP front end for wardwatch.
//!
//! Mounts the [`wardwatch_api`] router under `/api`, guards every route except
//! `/api/health` with HTTP Basic auth, and traces each request.

pub mod auth;
pub mod error;

pub use error::Error;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::{Router, middleware};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use wardwatch_core::store::WasteStore;

use auth::{AuthConfig, require_auth};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `WARDWATCH_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:               String,
  #[serde(default = "default_port")]
  pub port:               u16,
  /// A filesystem path, `sqlite://path`, or `:memory:`.
  pub database_url:       String,
  pub auth_username:      String,
  pub auth_password_hash: String,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8080 }

/// Where the SQLite store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Database {
  Memory,
  File(PathBuf),
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn auth(&self) -> AuthConfig {
    AuthConfig {
      username:      self.auth_username.clone(),
      password_hash: self.auth_password_hash.clone(),
    }
  }

  /// Interpret `database_url`.
  pub fn database(&self) -> Result<Database, Error> {
    let url = self.database_url.trim();
    let path = url.strip_prefix("sqlite://").unwrap_or(url);
    match path {
      "" => Err(Error::Config("database_url is empty".to_string())),
      ":memory:" => Ok(Database::Memory),
      path => Ok(Database::File(expand_tilde(Path::new(path)))),
    }
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router.
pub fn router<S>(store: Arc<S>, auth: Arc<AuthConfig>) -> Router
where
  S: WasteStore + 'static,
{
  let api = wardwatch_api::api_router(store)
    .route_layer(middleware::from_fn_with_state(auth, require_auth))
    .merge(wardwatch_api::health_router());

  Router::new()
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────
