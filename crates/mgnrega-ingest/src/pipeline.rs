//! One ingestion run: fetch → validate → de-duplicate → replace.

use chrono::Utc;
use mgnrega_core::{
  dedup::dedup,
  ingestion::{IngestionRun, NewIngestionRun},
  normalize::normalize_all,
  store::PerformanceStore,
};
use thiserror::Error;
use tracing::Instrument as _;

use crate::fetch::{FetchError, RecordSource};

/// A run-aborting failure. The persisted dataset is untouched in every
/// case.
#[derive(Debug, Error)]
pub enum PipelineError {
  #[error("fetch failed: {0}")]
  Fetch(#[from] FetchError),

  #[error("dataset replace failed: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Why a run finished without replacing the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
  /// Upstream returned no records.
  EmptyFetch,
  /// Every fetched record failed validation.
  NoValidRecords,
}

/// How a run that did not fail ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
  Replaced(IngestionRun),
  Skipped(SkipReason),
}

/// The pipeline, wired to a record source and a store.
pub struct Pipeline<Src, St> {
  source: Src,
  store:  St,
}

impl<Src, St> Pipeline<Src, St>
where
  Src: RecordSource,
  St: PerformanceStore,
{
  pub fn new(source: Src, store: St) -> Self { Self { source, store } }

  /// Execute one run. Row-level validation failures are logged and skipped;
  /// fetch and replace failures abort the run.
  pub async fn run(&self) -> Result<IngestOutcome, PipelineError> {
    let mut run = NewIngestionRun::new(Utc::now());
    let span = tracing::info_span!("ingestion", run_id = %run.run_id);

    async move {
      tracing::info!("fetching upstream records");
      let raws = self.source.fetch().await?;
      run.fetched = raws.len();

      if raws.is_empty() {
        tracing::info!("no records in upstream response; keeping current dataset");
        return Ok(IngestOutcome::Skipped(SkipReason::EmptyFetch));
      }
      tracing::info!(fetched = run.fetched, "validating records");

      let report = normalize_all(&raws);
      for rejected in &report.rejections {
        tracing::warn!(
          index = rejected.index,
          district = rejected.district.as_deref().unwrap_or("UNKNOWN"),
          reason = %rejected.reason,
          "skipping record",
        );
      }
      run.rejected = report.rejections.len();
      tracing::info!(valid = report.records.len(), rejected = run.rejected, "validation complete");

      let deduped = dedup(report.records);
      run.duplicates = deduped.duplicates;
      tracing::info!(
        duplicates = run.duplicates,
        unique = deduped.records.len(),
        "removed duplicate records",
      );

      if deduped.records.is_empty() {
        tracing::warn!("no valid records survived; keeping current dataset");
        return Ok(IngestOutcome::Skipped(SkipReason::NoValidRecords));
      }

      let committed = self
        .store
        .replace_all(deduped.records, run)
        .await
        .map_err(|e| PipelineError::Store(Box::new(e)))?;
      tracing::info!(
        deleted = committed.deleted,
        inserted = committed.inserted,
        "dataset replaced",
      );

      Ok(IngestOutcome::Replaced(committed))
    }
    .instrument(span)
    .await
  }
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;
  use mgnrega_core::raw::RawRecord;
  use mgnrega_store_sqlite::SqliteStore;
  use serde_json::{Value, json};

  use super::*;

  /// Serves a fixed batch of records.
  struct StaticSource(Vec<RawRecord>);

  impl RecordSource for StaticSource {
    async fn fetch(&self) -> Result<Vec<RawRecord>, FetchError> { Ok(self.0.clone()) }
  }

  /// Always reports an upstream error.
  struct FailingSource;

  impl RecordSource for FailingSource {
    async fn fetch(&self) -> Result<Vec<RawRecord>, FetchError> {
      Err(FetchError::Upstream("Invalid API key".into()))
    }
  }

  fn raw(value: Value) -> RawRecord { serde_json::from_value(value).unwrap() }

  fn row(district: &str, month: &str, workers: &str) -> RawRecord {
    raw(json!({
      "fin_year": "2024-25",
      "month": month,
      "state_name": "Maharashtra",
      "district_name": district,
      "Total_No_of_Workers": workers,
    }))
  }

  async fn store() -> SqliteStore { SqliteStore::open_in_memory().await.unwrap() }

  async fn seeded_store() -> SqliteStore {
    let s = store().await;
    Pipeline::new(StaticSource(vec![row("Nagpur", "Mar", "10")]), s.clone())
      .run()
      .await
      .unwrap();
    s
  }

  #[tokio::test]
  async fn duplicate_month_spellings_collapse_to_first() {
    let s = store().await;
    let pipeline = Pipeline::new(
      StaticSource(vec![row(" Pune ", "Apr", "111"), row("Pune", "April", "222")]),
      s.clone(),
    );

    let outcome = pipeline.run().await.unwrap();
    let IngestOutcome::Replaced(committed) = outcome else {
      panic!("expected a replace, got {outcome:?}");
    };
    assert_eq!(committed.fetched, 2);
    assert_eq!(committed.duplicates, 1);
    assert_eq!(committed.inserted, 1);

    let history = s.history_for_district("Pune").await.unwrap();
    assert_eq!(history.len(), 1);
    let survivor = &history[0].record;
    assert_eq!(survivor.district_name, "Pune");
    assert_eq!(survivor.reporting_date, NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
    assert_eq!(survivor.metrics.total_workers, Some(111));
  }

  #[tokio::test]
  async fn bad_rows_are_counted_not_fatal() {
    let s = store().await;
    let outcome = Pipeline::new(
      StaticSource(vec![
        row("Pune", "Apr", "1"),
        row("Pune", "Smarch", "2"),
        row("   ", "Apr", "3"),
        raw(json!({"district_name": "Thane"})),
      ]),
      s.clone(),
    )
    .run()
    .await
    .unwrap();

    let IngestOutcome::Replaced(committed) = outcome else {
      panic!("expected a replace, got {outcome:?}");
    };
    assert_eq!(committed.rejected, 3);
    assert_eq!(committed.inserted, 1);
    assert_eq!(s.record_count().await.unwrap(), 1);
  }

  #[tokio::test]
  async fn non_object_element_is_rejected_not_fatal() {
    let s = store().await;
    let outcome = Pipeline::new(
      StaticSource(vec![row("Pune", "Apr", "1"), raw(json!(null))]),
      s.clone(),
    )
    .run()
    .await
    .unwrap();

    let IngestOutcome::Replaced(committed) = outcome else {
      panic!("expected a replace, got {outcome:?}");
    };
    assert_eq!(committed.fetched, 2);
    assert_eq!(committed.rejected, 1);
    assert_eq!(committed.inserted, 1);
    assert_eq!(s.list_districts(None).await.unwrap(), vec!["Pune"]);
  }

  #[tokio::test]
  async fn replace_supersedes_previous_run() {
    let s = seeded_store().await;
    Pipeline::new(StaticSource(vec![row("Pune", "Apr", "5")]), s.clone())
      .run()
      .await
      .unwrap();

    assert_eq!(s.list_districts(None).await.unwrap(), vec!["Pune"]);
    assert_eq!(s.last_ingestion().await.unwrap().unwrap().deleted, 1);
  }

  #[tokio::test]
  async fn fetch_failure_leaves_dataset_untouched() {
    let s = seeded_store().await;
    let marker = s.last_ingestion().await.unwrap();

    let err = Pipeline::new(FailingSource, s.clone()).run().await.unwrap_err();
    assert!(matches!(err, PipelineError::Fetch(FetchError::Upstream(_))));

    assert_eq!(s.list_districts(None).await.unwrap(), vec!["Nagpur"]);
    assert_eq!(s.last_ingestion().await.unwrap(), marker);
  }

  #[tokio::test]
  async fn empty_fetch_skips_replace() {
    let s = seeded_store().await;
    let outcome = Pipeline::new(StaticSource(vec![]), s.clone()).run().await.unwrap();
    assert_eq!(outcome, IngestOutcome::Skipped(SkipReason::EmptyFetch));
    assert_eq!(s.record_count().await.unwrap(), 1);
  }

  #[tokio::test]
  async fn all_invalid_skips_replace() {
    let s = seeded_store().await;
    let outcome = Pipeline::new(
      StaticSource(vec![row("Pune", "Sept", "1"), row("", "Apr", "2")]),
      s.clone(),
    )
    .run()
    .await
    .unwrap();
    assert_eq!(outcome, IngestOutcome::Skipped(SkipReason::NoValidRecords));
    assert_eq!(s.list_districts(None).await.unwrap(), vec!["Nagpur"]);
  }

  #[tokio::test]
  async fn store_failure_is_reported() {
    let s = seeded_store().await;
    s.clone().close().await.unwrap();
    let err = Pipeline::new(StaticSource(vec![row("Pune", "Apr", "1")]), s)
      .run()
      .await
      .unwrap_err();
    assert!(matches!(err, PipelineError::Store(_)));
  }
}
