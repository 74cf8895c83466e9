//! Error types and axum `IntoResponse` implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use thiserror::Error;
use wardwatch_core::envelope::ErrorBody;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unauthorized")]
  Unauthorized,
  #[error("invalid configuration: {0}")]
  Config(String),
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    match self {
      Error::Unauthorized => {
        let body = ErrorBody {
          success: false,
          error:   "Unauthorized".into(),
          details: Vec::new(),
        };
        let mut res = (StatusCode::UNAUTHORIZED, Json(body)).into_response();
        res.headers_mut().insert(
          header::WWW_AUTHENTICATE,
          HeaderValue::from_static("Basic realm=\"wardwatch\""),
        );
        res
      }
      Error::Config(msg) => {
        tracing::error!(error = %msg, "configuration error surfaced in a request");
        let body = ErrorBody {
          success: false,
          error:   "Internal server error".into(),
          details: Vec::new(),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
      }
    }
  }
}
