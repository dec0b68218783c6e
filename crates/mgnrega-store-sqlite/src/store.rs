//! [`SqliteStore`], the SQLite implementation of [`PerformanceStore`].

use std::{path::Path, time::Duration};

use chrono::{SubsecRound as _, Utc};
use rusqlite::OptionalExtension as _;

use mgnrega_core::{
  ingestion::{IngestionRun, NewIngestionRun},
  record::{PerformanceRecord, StoredRecord},
  store::PerformanceStore,
};

use crate::{
  Result,
  encode::{
    INSERT_RECORD_SQL, RawIngestionRun, RawStoredRecord, SELECT_RECORD_SQL,
    encode_dt, encode_record, encode_uuid,
  },
  schema::{SCHEMA, TABLE},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// How long a statement waits on another connection's write lock (e.g. an
/// ingestion replace in progress) before failing with `SQLITE_BUSY`.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// The performance table backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. All clones
/// share one connection, so [`SqliteStore::close`] on any of them closes it
/// for all.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Close the underlying connection, flushing any pending work.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a `SELECT` over the performance table with `filter` appended,
  /// binding a single district parameter.
  async fn select_records(
    &self,
    filter: &'static str,
    district: &str,
  ) -> Result<Vec<StoredRecord>> {
    let sql = format!("{} {filter}", SELECT_RECORD_SQL.as_str());
    let district = district.to_owned();

    let raws: Vec<RawStoredRecord> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![district], RawStoredRecord::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawStoredRecord::into_stored).collect()
  }
}

// ─── PerformanceStore impl ───────────────────────────────────────────────────

impl PerformanceStore for SqliteStore {
  type Error = crate::Error;

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn replace_all(
    &self,
    records: Vec<PerformanceRecord>,
    run: NewIngestionRun,
  ) -> Result<IngestionRun> {
    let rows: Vec<_> = records.iter().map(encode_record).collect();
    // Timestamps are persisted at microsecond precision; truncate up front so
    // the returned run equals what `last_ingestion` reads back.
    let started_at     = run.started_at.trunc_subsecs(6);
    let run_id_str     = encode_uuid(run.run_id);
    let started_at_str = encode_dt(started_at);
    let counts         = [run.fetched, run.rejected, run.duplicates]
      .map(|n| i64::try_from(n).unwrap_or(i64::MAX));

    // Everything below runs in one transaction. Any `?` before `commit`
    // drops `tx`, which rolls back both the delete and the partial insert.
    let (deleted, inserted, finished_at) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let deleted = tx.execute(&format!("DELETE FROM {TABLE}"), [])?;

        let mut inserted = 0;
        {
          let mut stmt = tx.prepare(INSERT_RECORD_SQL.as_str())?;
          for row in &rows {
            inserted += stmt.execute(rusqlite::params_from_iter(row))?;
          }
        }

        let finished_at = Utc::now().trunc_subsecs(6);
        tx.execute(
          "INSERT INTO ingestion_runs (
             run_id, started_at, finished_at,
             fetched, rejected, duplicates, deleted, inserted
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            run_id_str,
            started_at_str,
            encode_dt(finished_at),
            counts[0],
            counts[1],
            counts[2],
            deleted,
            inserted,
          ],
        )?;

        tx.commit()?;
        Ok((deleted, inserted, finished_at))
      })
      .await?;

    Ok(IngestionRun {
      run_id: run.run_id,
      started_at,
      finished_at,
      fetched: run.fetched,
      rejected: run.rejected,
      duplicates: run.duplicates,
      deleted,
      inserted,
    })
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn list_states(&self) -> Result<Vec<String>> {
    let states = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT DISTINCT state_name FROM {TABLE}
           WHERE state_name IS NOT NULL AND state_name <> ''
           ORDER BY state_name ASC"
        ))?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(states)
  }

  async fn list_districts(&self, state: Option<&str>) -> Result<Vec<String>> {
    let state = state.map(str::to_owned);

    let districts = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT DISTINCT district_name FROM {TABLE}
           WHERE district_name <> ''
             AND (?1 IS NULL OR state_name = ?1 COLLATE NOCASE)
           ORDER BY district_name ASC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![state], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(districts)
  }

  async fn latest_for_district(&self, district: &str) -> Result<Option<StoredRecord>> {
    let mut latest = self
      .select_records(
        "WHERE district_name = ?1 COLLATE NOCASE
         ORDER BY data_for_date DESC, id ASC
         LIMIT 1",
        district,
      )
      .await?;
    Ok(latest.pop())
  }

  async fn history_for_district(&self, district: &str) -> Result<Vec<StoredRecord>> {
    self
      .select_records(
        "WHERE district_name = ?1 COLLATE NOCASE
         ORDER BY data_for_date DESC, id ASC",
        district,
      )
      .await
  }

  async fn record_count(&self) -> Result<usize> {
    let count: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {TABLE}"), [], |row| {
          row.get(0)
        })?)
      })
      .await?;
    Ok(usize::try_from(count)?)
  }

  async fn last_ingestion(&self) -> Result<Option<IngestionRun>> {
    let raw: Option<RawIngestionRun> = self
      .conn
      .call(|conn| {
        Ok(
          conn
            .query_row(
              "SELECT run_id, started_at, finished_at,
                      fetched, rejected, duplicates, deleted, inserted
               FROM ingestion_runs
               ORDER BY finished_at DESC, rowid DESC
               LIMIT 1",
              [],
              RawIngestionRun::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawIngestionRun::into_run).transpose()
  }
}
