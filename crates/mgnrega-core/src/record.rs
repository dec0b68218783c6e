//! Performance records: one row per district and reporting month.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::metrics::Metrics;

/// A validated, normalised record ready for storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRecord {
  /// First day of the reporting month.
  #[serde(rename = "data_for_date")]
  pub reporting_date: NaiveDate,
  /// Free text exactly as supplied upstream; may be absent.
  pub state_name:     Option<String>,
  /// Trimmed; never empty.
  pub district_name:  String,
  #[serde(flatten)]
  pub metrics:        Metrics,
}

/// The `(district, month)` pair that identifies a record. District names
/// compare ASCII-case-insensitively, matching SQLite's `NOCASE` collation;
/// non-ASCII letters must match exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
  district: String,
  date:     NaiveDate,
}

impl PerformanceRecord {
  pub fn identity_key(&self) -> IdentityKey {
    IdentityKey {
      district: self.district_name.to_ascii_lowercase(),
      date:     self.reporting_date,
    }
  }
}

/// A record as read back from storage, with its row id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
  pub id:     i64,
  #[serde(flatten)]
  pub record: PerformanceRecord,
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn record(district: &str) -> PerformanceRecord {
    PerformanceRecord {
      reporting_date: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
      state_name:     Some("Maharashtra".into()),
      district_name:  district.into(),
      metrics:        Metrics {
        total_households_worked: Some(1200),
        ..Default::default()
      },
    }
  }

  #[test]
  fn identity_ignores_district_case() {
    assert_eq!(record("Pune").identity_key(), record("PUNE").identity_key());
    assert_ne!(record("Pune").identity_key(), record("Nagpur").identity_key());
  }

  #[test]
  fn identity_folds_ascii_case_only() {
    assert_eq!(record("Étawah").identity_key(), record("ÉTAWAH").identity_key());
    assert_ne!(record("Étawah").identity_key(), record("étawah").identity_key());
  }

  #[test]
  fn stored_record_serialises_flat() {
    let stored = StoredRecord { id: 3, record: record("Pune") };
    let value = serde_json::to_value(&stored).unwrap();
    assert_eq!(value["id"], json!(3));
    assert_eq!(value["data_for_date"], json!("2024-04-01"));
    assert_eq!(value["district_name"], json!("Pune"));
    assert_eq!(value["total_households_worked"], json!(1200));
    assert_eq!(value["wages_lakhs"], json!(null));
  }
}
