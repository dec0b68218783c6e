//! Fetching raw records from the upstream open-data API.

use std::future::Future;

use mgnrega_core::raw::RawRecord;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;

use crate::IngestConfig;

/// A fetch failure. Every variant is fatal for the current run.
#[derive(Debug, Error)]
pub enum FetchError {
  /// Network, TLS, timeout, or body-decoding failure. The request URL is
  /// stripped because it carries the API key.
  #[error("request failed: {0}")]
  Transport(#[source] reqwest::Error),

  #[error("upstream returned HTTP {status}{}", fmt_message(.message))]
  Status {
    status:  StatusCode,
    message: Option<String>,
  },

  /// A 2xx response whose payload reports `"status": "error"`.
  #[error("upstream reported an error: {0}")]
  Upstream(String),
}

fn fmt_message(message: &Option<String>) -> String {
  message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
}

impl FetchError {
  fn transport(e: reqwest::Error) -> Self { Self::Transport(e.without_url()) }
}

/// Somewhere raw records come from.
///
/// An empty `Vec` is a valid, explicit "nothing to ingest" answer.
pub trait RecordSource: Send + Sync {
  fn fetch(
    &self,
  ) -> impl Future<Output = Result<Vec<RawRecord>, FetchError>> + Send + '_;
}

// ─── data.gov.in ─────────────────────────────────────────────────────────────

/// The JSON envelope returned by the open-data resource endpoint. Only the
/// fields we act on are modelled. Elements of `records` are decoded as
/// [`RawRecord`]s whatever their JSON type; shape checks happen during
/// validation.
#[derive(Debug, Default, Deserialize)]
struct Envelope {
  #[serde(default)]
  status:  Option<String>,
  #[serde(default)]
  message: Option<String>,
  #[serde(default)]
  records: Option<Vec<RawRecord>>,
}

/// Fetches one page of a data.gov.in resource.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct DataGovSource {
  client:  Client,
  url:     String,
  api_key: String,
  limit:   u32,
  offset:  u32,
}

impl DataGovSource {
  pub fn new(config: &IngestConfig) -> Result<Self, FetchError> {
    let client = Client::builder()
      .timeout(config.timeout())
      .build()
      .map_err(FetchError::transport)?;
    Ok(Self {
      client,
      url: format!(
        "{}/resource/{}",
        config.base_url.trim_end_matches('/'),
        config.resource_id
      ),
      api_key: config.api_key.clone(),
      limit: config.limit,
      offset: config.offset,
    })
  }
}

impl RecordSource for DataGovSource {
  async fn fetch(&self) -> Result<Vec<RawRecord>, FetchError> {
    tracing::debug!(url = %self.url, limit = self.limit, offset = self.offset, "requesting resource");

    let resp = self
      .client
      .get(&self.url)
      .query(&[
        ("api-key", self.api_key.clone()),
        ("format", "json".to_owned()),
        ("limit", self.limit.to_string()),
        ("offset", self.offset.to_string()),
      ])
      .send()
      .await
      .map_err(FetchError::transport)?;

    let status = resp.status();
    if !status.is_success() {
      // Error bodies are usually the same envelope with a message; use it
      // if it parses.
      let message = resp
        .json::<Envelope>()
        .await
        .ok()
        .and_then(|e| e.message);
      return Err(FetchError::Status { status, message });
    }

    let envelope: Envelope = resp.json().await.map_err(FetchError::transport)?;
    if envelope.status.as_deref() == Some("error") {
      return Err(FetchError::Upstream(
        envelope.message.unwrap_or_else(|| "no message".to_owned()),
      ));
    }

    Ok(envelope.records.unwrap_or_default())
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use axum::{
    Json, Router,
    extract::{Path, Query},
    http::StatusCode as AxumStatus,
    routing::get,
  };
  use serde_json::{Value, json};

  use super::*;

  /// Serve `app` on an ephemeral local port and return its base URL.
  async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{addr}")
  }

  fn config(base_url: String) -> IngestConfig {
    serde_json::from_value(json!({
      "base_url": base_url,
      "resource_id": "mgnrega",
      "api_key": "test-key",
      "limit": 50,
      "store_path": ":memory:",
    }))
    .unwrap()
  }

  async fn upstream(
    Path(resource): Path<String>,
    Query(params): Query<HashMap<String, String>>,
  ) -> Json<Value> {
    assert_eq!(resource, "mgnrega");
    assert_eq!(params.get("api-key").map(String::as_str), Some("test-key"));
    assert_eq!(params.get("format").map(String::as_str), Some("json"));
    assert_eq!(params.get("limit").map(String::as_str), Some("50"));
    assert_eq!(params.get("offset").map(String::as_str), Some("0"));
    Json(json!({
      "status": "ok",
      "total": 2,
      "records": [
        {"fin_year": "2024-25", "month": "Apr", "district_name": "Pune"},
        {"fin_year": "2024-25", "month": "Apr", "district_name": "Nagpur"},
      ],
    }))
  }

  #[tokio::test]
  async fn fetches_records_with_key_and_paging() {
    let base = serve(Router::new().route("/resource/{id}", get(upstream))).await;
    let source = DataGovSource::new(&config(base)).unwrap();

    let records = source.fetch().await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].text("district_name"), Some("Nagpur"));
  }

  #[tokio::test]
  async fn missing_records_is_an_empty_result() {
    let app = Router::new().route(
      "/resource/{id}",
      get(|| async { Json(json!({ "status": "ok" })) }),
    );
    let source = DataGovSource::new(&config(serve(app).await)).unwrap();
    assert!(source.fetch().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn malformed_element_does_not_fail_the_batch() {
    let app = Router::new().route(
      "/resource/{id}",
      get(|| async {
        Json(json!({
          "status": "ok",
          "records": [
            {"fin_year": "2024-25", "month": "Apr", "district_name": "Pune"},
            null,
          ],
        }))
      }),
    );
    let source = DataGovSource::new(&config(serve(app).await)).unwrap();

    let records = source.fetch().await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].text("district_name"), Some("Pune"));
    assert!(!records[1].is_object());
  }

  #[tokio::test]
  async fn error_payload_is_fatal() {
    let app = Router::new().route(
      "/resource/{id}",
      get(|| async { Json(json!({ "status": "error", "message": "Invalid API key" })) }),
    );
    let source = DataGovSource::new(&config(serve(app).await)).unwrap();
    let err = source.fetch().await.unwrap_err();
    assert!(matches!(err, FetchError::Upstream(ref m) if m == "Invalid API key"), "{err}");
  }

  #[tokio::test]
  async fn http_error_status_is_fatal() {
    let app = Router::new().route(
      "/resource/{id}",
      get(|| async {
        (AxumStatus::FORBIDDEN, Json(json!({ "status": "error", "message": "Key not authorised" })))
      }),
    );
    let source = DataGovSource::new(&config(serve(app).await)).unwrap();
    let err = source.fetch().await.unwrap_err();
    assert!(matches!(err, FetchError::Status { status, .. } if status == StatusCode::FORBIDDEN));
    assert_eq!(err.to_string(), "upstream returned HTTP 403 Forbidden: Key not authorised");
  }

  #[tokio::test]
  async fn transport_errors_do_not_leak_the_key() {
    // Nothing listens on port 9 locally.
    let source = DataGovSource::new(&config("http://127.0.0.1:9".to_owned())).unwrap();
    let err = source.fetch().await.unwrap_err();
    assert!(matches!(err, FetchError::Transport(_)));
    assert!(!format!("{err:?}").contains("test-key"));
  }
}
