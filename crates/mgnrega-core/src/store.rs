//! The `PerformanceStore` trait.
//!
//! Implemented by storage backends (e.g. `mgnrega-store-sqlite`). The
//! ingestion pipeline writes through it and the query API reads through it;
//! neither depends on a concrete backend.

use std::future::Future;

use crate::{
  ingestion::{IngestionRun, NewIngestionRun},
  record::{PerformanceRecord, StoredRecord},
};

/// Abstraction over the persisted performance table.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait PerformanceStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Atomically replace the whole dataset with `records` and record `run`
  /// as the latest successful ingestion.
  ///
  /// Either every old row is gone and every new row is present, or (on
  /// error) the previous dataset and previous marker are untouched.
  /// Concurrent readers observe one state or the other, never a mix.
  fn replace_all(
    &self,
    records: Vec<PerformanceRecord>,
    run: NewIngestionRun,
  ) -> impl Future<Output = Result<IngestionRun, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Distinct non-empty state names, ascending.
  fn list_states(
    &self,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  /// Distinct non-empty district names, ascending, optionally restricted
  /// to one state (matched case-insensitively).
  fn list_districts<'a>(
    &'a self,
    state: Option<&'a str>,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + 'a;

  /// The most recent record for a district (matched case-insensitively).
  fn latest_for_district<'a>(
    &'a self,
    district: &'a str,
  ) -> impl Future<Output = Result<Option<StoredRecord>, Self::Error>> + Send + 'a;

  /// Every record for a district (matched case-insensitively), newest
  /// first. Empty if the district is unknown.
  fn history_for_district<'a>(
    &'a self,
    district: &'a str,
  ) -> impl Future<Output = Result<Vec<StoredRecord>, Self::Error>> + Send + 'a;

  /// Number of rows in the current dataset.
  fn record_count(
    &self,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// The most recent committed ingestion run, if any.
  fn last_ingestion(
    &self,
  ) -> impl Future<Output = Result<Option<IngestionRun>, Self::Error>> + Send + '_;
}
