//! The numeric metrics carried by every performance record.
//!
//! The upstream feed names each metric in its own scheme
//! (`Total_No_of_JobCards_issued`, `Wages`, ...). The mapping to our field
//! names is one-to-one and lives in a single table below; the struct, the
//! field catalogue used by storage backends, and the upstream extraction are
//! all generated from it so they cannot drift apart.

use serde::{Deserialize, Serialize};

use crate::raw::RawRecord;

// ─── Field catalogue ─────────────────────────────────────────────────────────

/// Whether a metric is a whole-number count or a monetary/percentage figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
  Int,
  Float,
}

/// A single metric value, tagged with its kind. `None` means the upstream
/// field was missing or not numeric; it is never coerced to zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
  Int(Option<i64>),
  Float(Option<f64>),
}

/// Static description of one metric column.
#[derive(Debug, Clone, Copy)]
pub struct MetricField {
  /// Our field name; also the JSON key and the SQL column name.
  pub name:     &'static str,
  /// The field name used by the upstream feed.
  pub upstream: &'static str,
  pub kind:     MetricKind,
}

/// Conversion from a tagged [`MetricValue`] into a concrete field type.
pub trait FromMetricValue: Sized {
  fn from_metric_value(value: MetricValue) -> Self;
}

impl FromMetricValue for Option<i64> {
  fn from_metric_value(value: MetricValue) -> Self {
    match value {
      MetricValue::Int(v) => v,
      MetricValue::Float(_) => None,
    }
  }
}

impl FromMetricValue for Option<f64> {
  fn from_metric_value(value: MetricValue) -> Self {
    match value {
      MetricValue::Float(v) => v,
      MetricValue::Int(_) => None,
    }
  }
}

impl From<Option<i64>> for MetricValue {
  fn from(v: Option<i64>) -> Self { Self::Int(v) }
}

impl From<Option<f64>> for MetricValue {
  fn from(v: Option<f64>) -> Self { Self::Float(v) }
}

macro_rules! metric_ty {
  (Int) => { Option<i64> };
  (Float) => { Option<f64> };
}

macro_rules! metrics {
  ($( $(#[$meta:meta])* $field:ident : $kind:ident = $upstream:literal ),* $(,)?) => {
    /// All numeric metrics for one district and month. Every field is
    /// independently nullable.
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct Metrics {
      $( $(#[$meta])* pub $field: metric_ty!($kind), )*
    }

    /// Every metric column, in declaration order.
    pub const METRIC_FIELDS: &[MetricField] = &[
      $( MetricField { name: stringify!($field), upstream: $upstream, kind: MetricKind::$kind }, )*
    ];

    impl Metrics {
      /// Values in the same order as [`METRIC_FIELDS`].
      pub fn values(&self) -> Vec<MetricValue> {
        vec![ $( MetricValue::from(self.$field), )* ]
      }

      /// Build a `Metrics` by asking `get` for each field in turn. Storage
      /// backends use this to read a row without repeating the field list.
      pub fn try_from_fn<E>(
        mut get: impl FnMut(&MetricField) -> Result<MetricValue, E>,
      ) -> Result<Self, E> {
        Ok(Self {
          $( $field: FromMetricValue::from_metric_value(get(&MetricField {
            name:     stringify!($field),
            upstream: $upstream,
            kind:     MetricKind::$kind,
          })?), )*
        })
      }

      /// Best-effort extraction from an upstream record; unparseable fields
      /// become `None`.
      pub fn from_raw(raw: &RawRecord) -> Self {
        let infallible = Self::try_from_fn::<std::convert::Infallible>(|field| {
          Ok(raw.metric(field))
        });
        match infallible {
          Ok(metrics) => metrics,
          Err(never) => match never {},
        }
      }
    }
  };
}

metrics! {
  job_cards_issued:             Int   = "Total_No_of_JobCards_issued",
  total_active_workers:         Int   = "Total_No_of_Active_Workers",
  total_active_cards:           Int   = "Total_No_of_Active_Job_Cards",
  total_workers:                Int   = "Total_No_of_Workers",
  sc_active_workers:            Int   = "SC_workers_against_active_workers",
  st_active_workers:            Int   = "ST_workers_against_active_workers",
  approved_labour_budget:       Float = "Approved_Labour_Budget",
  persondays_liability:         Float = "Persondays_of_Central_Liability_so_far",
  sc_persondays:                Float = "SC_persondays",
  st_persondays:                Float = "ST_persondays",
  women_persondays:             Float = "Women_Persondays",
  avg_days_employment_per_hh:   Float = "Average_days_of_employment_provided_per_Household",
  avg_wage_rate:                Float = "Average_Wage_rate_per_day_per_person",
  hh_completed_100_days:        Int   = "Total_No_of_HHs_completed_100_Days_of_Wage_Employment",
  total_households_worked:      Int   = "Total_Households_Worked",
  total_individuals_worked:     Int   = "Total_Individuals_Worked",
  differently_abled_worked:     Int   = "Differently_abled_persons_worked",
  gps_with_nil_exp:             Int   = "Number_of_GPs_with_NIL_exp",
  total_works_takenup:          Int   = "Total_No_of_Works_Takenup",
  ongoing_works:                Int   = "Number_of_Ongoing_Works",
  completed_works:              Int   = "Number_of_Completed_Works",
  pct_nrm_expenditure:          Float = "percent_of_NRM_Expenditure",
  pct_category_b_works:         Float = "percent_of_Category_B_Works",
  pct_agri_expenditure:         Float = "percent_of_Expenditure_on_Agriculture_Allied_Works",
  /// Rupees, in lakhs.
  total_exp_lakhs:              Float = "Total_Exp",
  wages_lakhs:                  Float = "Wages",
  material_skilled_wages_lakhs: Float = "Material_and_skilled_Wages",
  admin_exp_lakhs:              Float = "Total_Adm_Expenditure",
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;

  use super::*;

  #[test]
  fn field_names_and_upstream_names_are_unique() {
    let names: HashSet<_> = METRIC_FIELDS.iter().map(|f| f.name).collect();
    let upstream: HashSet<_> = METRIC_FIELDS.iter().map(|f| f.upstream).collect();
    assert_eq!(names.len(), METRIC_FIELDS.len());
    assert_eq!(upstream.len(), METRIC_FIELDS.len());
  }

  #[test]
  fn values_follow_catalogue_order_and_kind() {
    let metrics = Metrics {
      job_cards_issued: Some(7),
      admin_exp_lakhs: Some(1.5),
      ..Default::default()
    };
    let values = metrics.values();
    assert_eq!(values.len(), METRIC_FIELDS.len());
    for (field, value) in METRIC_FIELDS.iter().zip(&values) {
      match (field.kind, value) {
        (MetricKind::Int, MetricValue::Int(_)) => {}
        (MetricKind::Float, MetricValue::Float(_)) => {}
        other => panic!("kind mismatch for {}: {other:?}", field.name),
      }
    }
    assert_eq!(values[0], MetricValue::Int(Some(7)));
    assert_eq!(values[values.len() - 1], MetricValue::Float(Some(1.5)));
  }

  #[test]
  fn try_from_fn_reassembles_values() {
    let original = Metrics {
      total_workers: Some(0),
      wages_lakhs: Some(12.25),
      ..Default::default()
    };
    let mut values = original.values().into_iter();
    let rebuilt =
      Metrics::try_from_fn::<()>(|_| values.next().ok_or(())).unwrap();
    assert_eq!(rebuilt, original);
  }
}
