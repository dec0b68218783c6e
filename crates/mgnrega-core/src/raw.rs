//! The loosely-typed record shape delivered by the upstream feed.
//!
//! Nothing outside [`crate::normalize`] should look inside a [`RawRecord`];
//! the validator is the single place where upstream values are coerced into
//! typed fields.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::metrics::{MetricField, MetricKind, MetricValue};

/// One element of the upstream `records` array.
///
/// Normally a JSON object of string keys to arbitrary values, but any JSON
/// value is accepted so a single malformed element cannot fail the decode
/// of the whole batch. Field accessors see a non-object as having no fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(Value);

impl RawRecord {
  pub fn new(fields: Map<String, Value>) -> Self { Self(Value::Object(fields)) }

  /// Whether the element is a JSON object at all.
  pub fn is_object(&self) -> bool { self.0.is_object() }

  pub fn get(&self, key: &str) -> Option<&Value> { self.0.get(key) }

  /// A field's value if it is a JSON string. Numbers, booleans, and nulls
  /// are not treated as text.
  pub fn text(&self, key: &str) -> Option<&str> {
    self.0.get(key).and_then(Value::as_str)
  }

  /// Best-effort numeric extraction for a metric field.
  pub fn metric(&self, field: &MetricField) -> MetricValue {
    let value = self.0.get(field.upstream);
    match field.kind {
      MetricKind::Int => MetricValue::Int(value.and_then(parse_int)),
      MetricKind::Float => MetricValue::Float(value.and_then(parse_float)),
    }
  }
}

impl From<Map<String, Value>> for RawRecord {
  fn from(fields: Map<String, Value>) -> Self { Self::new(fields) }
}

impl From<Value> for RawRecord {
  fn from(value: Value) -> Self { Self(value) }
}

// ─── Numeric coercion ────────────────────────────────────────────────────────

/// Integer counts. A fractional figure is truncated toward zero; anything
/// that is not a finite number yields `None`.
fn parse_int(value: &Value) -> Option<i64> {
  match value {
    Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(truncate)),
    Value::String(s) => {
      let s = s.trim();
      s.parse::<i64>()
        .ok()
        .or_else(|| s.parse::<f64>().ok().and_then(truncate))
    }
    _ => None,
  }
}

fn parse_float(value: &Value) -> Option<f64> {
  let parsed = match value {
    Value::Number(n) => n.as_f64(),
    Value::String(s) => s.trim().parse::<f64>().ok(),
    _ => None,
  };
  parsed.filter(|f| f.is_finite())
}

fn truncate(f: f64) -> Option<i64> {
  let t = f.trunc();
  (t.is_finite() && t >= i64::MIN as f64 && t <= i64::MAX as f64)
    .then_some(t as i64)
}
