//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use thiserror::Error;
use wardwatch_core::{
  envelope::{ErrorBody, FieldError},
  store::DomainError,
};

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{message}")]
  Validation {
    message: String,
    details: Vec<FieldError>,
  },

  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn validation(details: Vec<FieldError>) -> Self {
    Self::Validation { message: "Validation error".into(), details }
  }

  pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
    Self::validation(vec![FieldError::new(field, message)])
  }

  /// Recover the domain outcome from a backend error, falling back to an
  /// opaque store failure.
  pub fn from_store<E>(e: E) -> Self
  where
    E: DomainError + std::error::Error + Send + Sync + 'static,
  {
    let mapped = e.domain().map(Self::from_domain);
    mapped.unwrap_or_else(|| Self::Store(Box::new(e)))
  }

  fn from_domain(e: &wardwatch_core::Error) -> Self {
    use wardwatch_core::Error as E;
    match e {
      E::NotFound { .. } => Self::NotFound(e.to_string()),
      E::Conflict { .. } | E::NoWards => Self::Conflict(e.to_string()),
      E::MissingReference { field, .. } | E::InvalidValue { field, .. } => {
        Self::invalid(*field, e.to_string())
      }
    }
  }

  pub fn status(&self) -> StatusCode {
    match self {
      Self::Validation { .. } => StatusCode::BAD_REQUEST,
      Self::NotFound(_) => StatusCode::NOT_FOUND,
      Self::Conflict(_) => StatusCode::CONFLICT,
      Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl From<wardwatch_core::Error> for ApiError {
  fn from(e: wardwatch_core::Error) -> Self { Self::from_domain(&e) }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    Self::invalid("body", rejection.body_text())
  }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self {
    Self::Validation {
      message: "Invalid query parameters".into(),
      details: vec![FieldError::new("query", rejection.body_text())],
    }
  }
}

impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self {
    Self::invalid("id", rejection.body_text())
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let body = match self {
      Self::Validation { message, details } => {
        ErrorBody { success: false, error: message, details }
      }
      Self::NotFound(message) | Self::Conflict(message) => {
        ErrorBody { success: false, error: message, details: Vec::new() }
      }
      Self::Store(e) => {
        tracing::error!(error = %e, "store failure");
        ErrorBody {
          success: false,
          error:   "Internal server error".into(),
          details: Vec::new(),
        }
      }
    };
    (status, Json(body)).into_response()
  }
}
