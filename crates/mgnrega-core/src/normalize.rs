//! Validation and normalisation of upstream records.

use crate::{
  Rejection,
  metrics::Metrics,
  month::{financial_year_start, first_of_month, month_number},
  raw::RawRecord,
  record::PerformanceRecord,
};

/// Upstream field names read directly by the validator. Metric fields are
/// listed in [`crate::metrics::METRIC_FIELDS`].
pub mod fields {
  pub const FIN_YEAR: &str = "fin_year";
  pub const MONTH: &str = "month";
  pub const STATE_NAME: &str = "state_name";
  pub const DISTRICT_NAME: &str = "district_name";
}

/// Turn one raw record into a [`PerformanceRecord`], or say why not.
///
/// Pure: the same input always yields the same output.
pub fn normalize(raw: &RawRecord) -> Result<PerformanceRecord, Rejection> {
  if !raw.is_object() {
    return Err(Rejection::NotAnObject);
  }

  let (fin_year, month) = match (raw.text(fields::FIN_YEAR), raw.text(fields::MONTH)) {
    (Some(y), Some(m)) if !y.is_empty() && !m.is_empty() => (y, m),
    _ => return Err(Rejection::MissingPeriod),
  };

  let month_no =
    month_number(month).ok_or_else(|| Rejection::UnknownMonth(month.to_owned()))?;
  let year = financial_year_start(fin_year)
    .ok_or_else(|| Rejection::InvalidFinancialYear(fin_year.to_owned()))?;
  let reporting_date = first_of_month(year, month_no)
    .ok_or_else(|| Rejection::InvalidFinancialYear(fin_year.to_owned()))?;

  let district_name = raw
    .text(fields::DISTRICT_NAME)
    .map(str::trim)
    .filter(|d| !d.is_empty())
    .ok_or(Rejection::MissingDistrict)?
    .to_owned();

  Ok(PerformanceRecord {
    reporting_date,
    state_name: raw.text(fields::STATE_NAME).map(str::to_owned),
    district_name,
    metrics: Metrics::from_raw(raw),
  })
}

/// A raw record that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRecord {
  /// Upstream position, for log correlation.
  pub index:    usize,
  /// The district name as supplied, if there was one.
  pub district: Option<String>,
  pub reason:   Rejection,
}

/// Result of normalising a whole batch.
#[derive(Debug, Clone, Default)]
pub struct NormalizeReport {
  /// Valid records, in upstream order.
  pub records:    Vec<PerformanceRecord>,
  pub rejections: Vec<RejectedRecord>,
}

/// Normalise every record; rejections are collected rather than aborting.
pub fn normalize_all(raws: &[RawRecord]) -> NormalizeReport {
  let mut report = NormalizeReport::default();
  for (index, raw) in raws.iter().enumerate() {
    match normalize(raw) {
      Ok(record) => report.records.push(record),
      Err(reason) => report.rejections.push(RejectedRecord {
        index,
        district: raw
          .text(fields::DISTRICT_NAME)
          .map(str::trim)
          .filter(|d| !d.is_empty())
          .map(str::to_owned),
        reason,
      }),
    }
  }
  report
}
