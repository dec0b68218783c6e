//! Error types for `mgnrega-core`.

use thiserror::Error;

/// Why a raw upstream record was discarded during normalisation.
///
/// Rejections are row-level: they are counted and logged, and the ingestion
/// run carries on with the remaining records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
  #[error("record is not a JSON object")]
  NotAnObject,

  #[error("missing fin_year or month")]
  MissingPeriod,

  #[error("invalid fin_year {0:?}")]
  InvalidFinancialYear(String),

  #[error("unrecognised month {0:?}")]
  UnknownMonth(String),

  #[error("district_name is missing or empty")]
  MissingDistrict,
}
