//! Collapsing records that share an identity key.

use std::collections::HashSet;

use crate::record::PerformanceRecord;

/// Output of [`dedup`].
#[derive(Debug, Clone, Default)]
pub struct Deduplicated {
  pub records:    Vec<PerformanceRecord>,
  /// How many later occurrences were dropped.
  pub duplicates: usize,
}

/// Keep the first record for each `(district, month)` key, in input order.
pub fn dedup(mut records: Vec<PerformanceRecord>) -> Deduplicated {
  let before = records.len();
  let mut seen = HashSet::with_capacity(before);
  records.retain(|r| seen.insert(r.identity_key()));
  Deduplicated { duplicates: before - records.len(), records }
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;
  use crate::metrics::Metrics;

  fn record(district: &str, month: u32, workers: i64) -> PerformanceRecord {
    PerformanceRecord {
      reporting_date: NaiveDate::from_ymd_opt(2024, month, 1).unwrap(),
      state_name:     Some("Maharashtra".into()),
      district_name:  district.into(),
      metrics:        Metrics { total_workers: Some(workers), ..Default::default() },
    }
  }

  #[test]
  fn first_occurrence_wins() {
    let out = dedup(vec![
      record("Pune", 4, 1),
      record("Nagpur", 4, 2),
      record("Pune", 4, 3),
      record("Pune", 4, 4),
    ]);
    assert_eq!(out.duplicates, 2);
    assert_eq!(out.records.len(), 2);
    assert_eq!(out.records[0].metrics.total_workers, Some(1));
    assert_eq!(out.records[1].district_name, "Nagpur");
  }

  #[test]
  fn survivor_follows_input_order() {
    let a = record("Pune", 4, 1);
    let b = record("Pune", 4, 2);
    let c = record("Pune", 4, 3);
    let orderings = [
      vec![a.clone(), b.clone(), c.clone()],
      vec![b.clone(), c.clone(), a.clone()],
      vec![c.clone(), a.clone(), b.clone()],
      vec![c.clone(), b.clone(), a.clone()],
    ];
    for ordering in orderings {
      let first = ordering[0].clone();
      let out = dedup(ordering);
      assert_eq!(out.records, vec![first]);
      assert_eq!(out.duplicates, 2);
    }
  }

  #[test]
  fn different_months_are_not_duplicates() {
    let out = dedup(vec![record("Pune", 3, 1), record("Pune", 4, 1)]);
    assert_eq!(out.duplicates, 0);
    assert_eq!(out.records.len(), 2);
  }

  #[test]
  fn district_case_does_not_split_identity() {
    let out = dedup(vec![record("Pune", 4, 1), record("PUNE", 4, 2)]);
    assert_eq!(out.duplicates, 1);
    assert_eq!(out.records[0].district_name, "Pune");
  }

  #[test]
  fn non_ascii_case_stays_distinct() {
    let out = dedup(vec![record("Étawah", 4, 1), record("étawah", 4, 2)]);
    assert_eq!(out.duplicates, 0);
    assert_eq!(out.records.len(), 2);
  }
}
