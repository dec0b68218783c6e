//! Handlers for the performance endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/states` | `{"states": [...]}` |
//! | `GET`  | `/districts` | Optional `?state=`; `{"districts": [...]}` |
//! | `GET`  | `/history/:district` | `{"data": [...]}`, newest first; 404 if none |
//! | `GET`  | `/:district` | `{"data": {...}}`, latest month; 404 if none |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use mgnrega_core::{record::StoredRecord, store::PerformanceStore};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

// ─── Envelopes ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct StatesBody {
  pub states: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DistrictsBody {
  pub districts: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DataBody<T> {
  pub data: T,
}

// ─── States ──────────────────────────────────────────────────────────────────

/// `GET /states`
pub async fn states<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<StatesBody>, ApiError>
where
  S: PerformanceStore,
{
  let states = store.list_states().await.map_err(ApiError::store)?;
  Ok(Json(StatesBody { states }))
}

// ─── Districts ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DistrictParams {
  /// Restrict to one state; matched case-insensitively. Empty means all.
  pub state: Option<String>,
}

/// `GET /districts[?state=<name>]`
pub async fn districts<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<DistrictParams>,
) -> Result<Json<DistrictsBody>, ApiError>
where
  S: PerformanceStore,
{
  let state = params.state.as_deref().filter(|s| !s.is_empty());
  let districts = store.list_districts(state).await.map_err(ApiError::store)?;
  Ok(Json(DistrictsBody { districts }))
}

// ─── District lookups ────────────────────────────────────────────────────────

/// `GET /:district`
pub async fn latest<S>(
  State(store): State<Arc<S>>,
  Path(district): Path<String>,
) -> Result<Json<DataBody<StoredRecord>>, ApiError>
where
  S: PerformanceStore,
{
  let record = store
    .latest_for_district(&district)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("No data found for district: {district}")))?;
  Ok(Json(DataBody { data: record }))
}

/// `GET /history/:district`
pub async fn history<S>(
  State(store): State<Arc<S>>,
  Path(district): Path<String>,
) -> Result<Json<DataBody<Vec<StoredRecord>>>, ApiError>
where
  S: PerformanceStore,
{
  let records = store
    .history_for_district(&district)
    .await
    .map_err(ApiError::store)?;
  if records.is_empty() {
    return Err(ApiError::NotFound(format!(
      "No history data found for district: {district}"
    )));
  }
  Ok(Json(DataBody { data: records }))
}
