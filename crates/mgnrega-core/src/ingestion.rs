//! Ingestion run markers.
//!
//! A run marker is written in the same transaction that replaces the
//! dataset, so a marker exists only for runs that committed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Pre-replace statistics handed to
/// [`crate::store::PerformanceStore::replace_all`]. The store fills in the
/// remaining fields of [`IngestionRun`].
#[derive(Debug, Clone)]
pub struct NewIngestionRun {
  pub run_id:     Uuid,
  pub started_at: DateTime<Utc>,
  /// Raw records received from upstream.
  pub fetched:    usize,
  /// Records discarded by validation.
  pub rejected:   usize,
  /// Records discarded as duplicates.
  pub duplicates: usize,
}

impl NewIngestionRun {
  pub fn new(started_at: DateTime<Utc>) -> Self {
    Self {
      run_id: Uuid::new_v4(),
      started_at,
      fetched: 0,
      rejected: 0,
      duplicates: 0,
    }
  }
}

/// A committed ingestion run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionRun {
  pub run_id:      Uuid,
  pub started_at:  DateTime<Utc>,
  /// Commit time of the replacing transaction.
  pub finished_at: DateTime<Utc>,
  pub fetched:     usize,
  pub rejected:    usize,
  pub duplicates:  usize,
  /// Rows removed from the previous dataset.
  pub deleted:     usize,
  pub inserted:    usize,
}
