//! Runtime configuration for an ingestion run.

use std::{fmt, path::PathBuf, time::Duration};

use serde::Deserialize;

/// Deserialised from the layered config (file, then `MGNREGA_*` environment
/// variables, then command-line overrides).
#[derive(Clone, Deserialize)]
pub struct IngestConfig {
  /// Root of the open-data API, without the `/resource/...` suffix.
  #[serde(default = "default_base_url")]
  pub base_url:     String,
  /// Identifier of the MGNREGA dataset on the open-data portal.
  pub resource_id:  String,
  pub api_key:      String,
  /// Page size requested from upstream.
  #[serde(default = "default_limit")]
  pub limit:        u32,
  #[serde(default)]
  pub offset:       u32,
  /// Whole-request timeout for the upstream call.
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
  pub store_path:   PathBuf,
}

fn default_base_url() -> String { "https://api.data.gov.in".to_owned() }

fn default_limit() -> u32 { 1000 }

fn default_timeout_secs() -> u64 { 60 }

impl IngestConfig {
  pub fn timeout(&self) -> Duration { Duration::from_secs(self.timeout_secs) }
}

// The API key must never reach the logs.
impl fmt::Debug for IngestConfig {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("IngestConfig")
      .field("base_url", &self.base_url)
      .field("resource_id", &self.resource_id)
      .field("api_key", &"<redacted>")
      .field("limit", &self.limit)
      .field("offset", &self.offset)
      .field("timeout_secs", &self.timeout_secs)
      .field("store_path", &self.store_path)
      .finish()
  }
}
