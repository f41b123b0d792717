//! Measure: a single health reading owned by exactly one person.

use chrono::{DateTime, Datelike as _, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Years a measure timestamp may fall in. Inside this range an RFC 3339
/// timestamp has a four-digit year, so its text form sorts chronologically.
pub const TIMESTAMP_YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

/// Reject timestamps outside [`TIMESTAMP_YEARS`].
pub fn check_timestamp(timestamp: DateTime<Utc>) -> Result<DateTime<Utc>> {
  if TIMESTAMP_YEARS.contains(&timestamp.year()) {
    Ok(timestamp)
  } else {
    Err(Error::TimestampOutOfRange(timestamp))
  }
}

/// A stored health reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
  pub id:           i64,
  /// The owning person. Measures are deleted together with their owner.
  pub person_id:    i64,
  /// Free-form type discriminant, e.g. `"weight"` or `"steps"`.
  pub measure_type: String,
  pub value:        String,
  /// Hint for interpreting `value`, e.g. `"double"` or `"integer"`.
  pub value_type:   Option<String>,
  pub timestamp:    DateTime<Utc>,
}

/// Input to [`PersonStore::record_measure`](crate::store::PersonStore::record_measure)
/// and to the initial measures of a [`NewPerson`](crate::person::NewPerson).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMeasure {
  pub measure_type: String,
  pub value:        String,
  #[serde(default)]
  pub value_type:   Option<String>,
  pub timestamp:    DateTime<Utc>,
}

impl NewMeasure {
  pub fn new(
    measure_type: impl Into<String>,
    value: impl Into<String>,
    timestamp: DateTime<Utc>,
  ) -> Self {
    Self {
      measure_type: measure_type.into(),
      value: value.into(),
      value_type: None,
      timestamp,
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;

  use super::*;

  #[test]
  fn timestamps_inside_four_digit_years_are_accepted() {
    for year in [0, 1970, 2024, 9999] {
      let ts = Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).unwrap();
      assert_eq!(check_timestamp(ts).unwrap(), ts);
    }
  }

  #[test]
  fn timestamps_outside_four_digit_years_are_rejected() {
    for year in [-1, 10000] {
      let ts = Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).unwrap();
      let err = check_timestamp(ts).unwrap_err();
      assert!(matches!(err, Error::TimestampOutOfRange(t) if t == ts), "{err}");
    }
  }
}
