//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Body text for every 500; internal detail goes to the log only.
pub const INTERNAL_ERROR_MESSAGE: &str = "An internal server error occurred";

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// No data for the requested selection; an expected outcome.
  #[error("not found: {0}")]
  NotFound(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "query failed");
        (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE.to_owned())
      }
    };
    (status, Json(json!({ "msg": message }))).into_response()
  }
}
