//! Encoding and decoding helpers between Rust domain types and the values
//! stored in SQLite columns.
//!
//! Reporting dates are stored as `YYYY-MM-DD` text so lexical order is
//! chronological. Timestamps are fixed-width RFC 3339 UTC strings. UUIDs are
//! hyphenated lowercase strings. Metrics are native INTEGER/REAL or NULL.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use mgnrega_core::{
  ingestion::IngestionRun,
  metrics::{METRIC_FIELDS, MetricField, MetricKind, MetricValue, Metrics},
  record::{PerformanceRecord, StoredRecord},
};
use rusqlite::{Row, types::Value};
use uuid::Uuid;

use crate::{Error, Result, schema::TABLE};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ────────────────────────────────────────────────────────────────

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Metrics ──────────────────────────────────────────────────────────────────

fn encode_metric(value: MetricValue) -> Value {
  match value {
    MetricValue::Int(Some(v)) => Value::Integer(v),
    MetricValue::Float(Some(v)) => Value::Real(v),
    MetricValue::Int(None) | MetricValue::Float(None) => Value::Null,
  }
}

/// Read one metric column by name, honouring its declared kind.
fn decode_metric(row: &Row<'_>, field: &MetricField) -> rusqlite::Result<MetricValue> {
  Ok(match field.kind {
    MetricKind::Int => MetricValue::Int(row.get(field.name)?),
    MetricKind::Float => MetricValue::Float(row.get(field.name)?),
  })
}

// ─── SQL ─────────────────────────────────────────────────────────────────────

/// Every column of the performance table, in insert/select order.
fn record_columns() -> Vec<&'static str> {
  ["id", "data_for_date", "state_name", "district_name"]
    .into_iter()
    .chain(METRIC_FIELDS.iter().map(|f| f.name))
    .collect()
}

pub static INSERT_RECORD_SQL: LazyLock<String> = LazyLock::new(|| {
  let columns = &record_columns()[1..];
  let placeholders: Vec<String> =
    (1..=columns.len()).map(|i| format!("?{i}")).collect();
  format!(
    "INSERT INTO {TABLE} ({}) VALUES ({})",
    columns.join(", "),
    placeholders.join(", ")
  )
});

pub static SELECT_RECORD_SQL: LazyLock<String> = LazyLock::new(|| {
  format!("SELECT {} FROM {TABLE}", record_columns().join(", "))
});

/// Positional parameters for [`INSERT_RECORD_SQL`].
pub fn encode_record(record: &PerformanceRecord) -> Vec<Value> {
  let mut params = Vec::with_capacity(3 + METRIC_FIELDS.len());
  params.push(Value::Text(encode_date(record.reporting_date)));
  params.push(record.state_name.clone().map_or(Value::Null, Value::Text));
  params.push(Value::Text(record.district_name.clone()));
  params.extend(record.metrics.values().into_iter().map(encode_metric));
  params
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// A performance row as read from SQLite, before date decoding.
pub struct RawStoredRecord {
  pub id:            i64,
  pub data_for_date: String,
  pub state_name:    Option<String>,
  pub district_name: String,
  pub metrics:       Metrics,
}

impl RawStoredRecord {
  /// Row mapper for [`SELECT_RECORD_SQL`].
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get("id")?,
      data_for_date: row.get("data_for_date")?,
      state_name:    row.get("state_name")?,
      district_name: row.get("district_name")?,
      metrics:       Metrics::try_from_fn(|field| decode_metric(row, field))?,
    })
  }

  pub fn into_stored(self) -> Result<StoredRecord> {
    Ok(StoredRecord {
      id:     self.id,
      record: PerformanceRecord {
        reporting_date: decode_date(&self.data_for_date)?,
        state_name:     self.state_name,
        district_name:  self.district_name,
        metrics:        self.metrics,
      },
    })
  }
}

/// An `ingestion_runs` row as read from SQLite.
pub struct RawIngestionRun {
  pub run_id:      String,
  pub started_at:  String,
  pub finished_at: String,
  pub fetched:     i64,
  pub rejected:    i64,
  pub duplicates:  i64,
  pub deleted:     i64,
  pub inserted:    i64,
}

impl RawIngestionRun {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      run_id:      row.get("run_id")?,
      started_at:  row.get("started_at")?,
      finished_at: row.get("finished_at")?,
      fetched:     row.get("fetched")?,
      rejected:    row.get("rejected")?,
      duplicates:  row.get("duplicates")?,
      deleted:     row.get("deleted")?,
      inserted:    row.get("inserted")?,
    })
  }

  pub fn into_run(self) -> Result<IngestionRun> {
    Ok(IngestionRun {
      run_id:      decode_uuid(&self.run_id)?,
      started_at:  decode_dt(&self.started_at)?,
      finished_at: decode_dt(&self.finished_at)?,
      fetched:     usize::try_from(self.fetched)?,
      rejected:    usize::try_from(self.rejected)?,
      duplicates:  usize::try_from(self.duplicates)?,
      deleted:     usize::try_from(self.deleted)?,
      inserted:    usize::try_from(self.inserted)?,
    })
  }
}
