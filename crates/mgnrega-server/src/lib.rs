//! HTTP front for the MGNREGA query API.
//!
//! Wraps [`mgnrega_api::api_router`] with the home route, CORS, and
//! per-request tracing.

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  http::{HeaderValue, Method, header},
  response::Html,
  routing::get,
};
use mgnrega_core::store::PerformanceStore;
use serde::Deserialize;
use thiserror::Error;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Path prefix the query API is mounted under.
pub const API_PREFIX: &str = "/api/v1/performance";

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `MGNREGA_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:        String,
  #[serde(default = "default_port")]
  pub port:        u16,
  pub store_path:  PathBuf,
  /// Single browser origin allowed to call the API with credentials. Any
  /// origin is allowed, without credentials, when unset.
  #[serde(default)]
  pub cors_origin: Option<String>,
}

fn default_host() -> String { "0.0.0.0".to_owned() }

fn default_port() -> u16 { 5000 }

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid CORS origin {origin:?}")]
  InvalidCorsOrigin {
    origin: String,
    #[source]
    source: axum::http::header::InvalidHeaderValue,
  },
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the CORS policy for `origin`.
pub fn cors_layer(origin: Option<&str>) -> Result<CorsLayer, Error> {
  let Some(origin) = origin else {
    return Ok(CorsLayer::permissive());
  };
  // Browsers send the origin without a trailing slash.
  let trimmed = origin.trim_end_matches('/');
  let value = HeaderValue::from_str(trimmed).map_err(|source| {
    Error::InvalidCorsOrigin { origin: origin.to_owned(), source }
  })?;
  Ok(
    CorsLayer::new()
      .allow_origin(value)
      .allow_methods([Method::GET, Method::OPTIONS])
      .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
      .allow_credentials(true),
  )
}

/// Build the full application router.
pub fn router<S>(store: Arc<S>, cors: CorsLayer) -> Router
where
  S: PerformanceStore + 'static,
{
  Router::new()
    .route("/", get(home))
    .nest(API_PREFIX, mgnrega_api::api_router(store))
    .layer(cors)
    .layer(TraceLayer::new_for_http())
}

async fn home() -> Html<&'static str> {
  Html("<h1>MGNREGA API</h1><p>API is running...</p>")
}
