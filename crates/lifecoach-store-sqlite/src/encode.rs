//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Birth dates are stored as `yyyy-MM-dd`. Measure timestamps are stored as
//! fixed-width RFC 3339 UTC strings (`2024-01-31T08:15:00.000Z`), so ordering
//! the column lexically orders it chronologically. That holds only for
//! four-digit years, so [`EncodedMeasure`] refuses anything else.

use chrono::{DateTime, SecondsFormat, Utc};
use lifecoach_core::{
  measure::{Measure, NewMeasure, check_timestamp},
  person::{BirthDate, Person},
};

use crate::{Error, Result};

// ─── Column lists ────────────────────────────────────────────────────────────

pub const PERSON_COLUMNS: &str =
  "idPerson, name, lastname, username, birthdate, email";

pub const MEASURE_COLUMNS: &str =
  "idMeasure, idPerson, measureType, measureValue, measureValueType, timestamp";

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── BirthDate ───────────────────────────────────────────────────────────────

pub fn encode_birthdate(d: BirthDate) -> String { d.to_string() }

pub fn decode_birthdate(s: &str) -> Result<BirthDate> { Ok(s.parse()?) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `Person` row.
pub struct RawPerson {
  pub id:         i64,
  pub first_name: String,
  pub last_name:  String,
  pub username:   String,
  pub birthdate:  String,
  pub email:      String,
}

impl RawPerson {
  /// Map a row selected with [`PERSON_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      first_name: row.get(1)?,
      last_name:  row.get(2)?,
      username:   row.get(3)?,
      birthdate:  row.get(4)?,
      email:      row.get(5)?,
    })
  }

  pub fn into_person(self, current_health: Vec<Measure>) -> Result<Person> {
    Ok(Person {
      id: self.id,
      first_name: self.first_name,
      last_name: self.last_name,
      username: self.username,
      birthdate: decode_birthdate(&self.birthdate)?,
      email: self.email,
      current_health,
    })
  }
}

/// Raw values read directly from a `Measure` row.
pub struct RawMeasure {
  pub id:           i64,
  pub person_id:    i64,
  pub measure_type: String,
  pub value:        String,
  pub value_type:   Option<String>,
  pub timestamp:    String,
}

impl RawMeasure {
  /// Map a row selected with [`MEASURE_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:           row.get(0)?,
      person_id:    row.get(1)?,
      measure_type: row.get(2)?,
      value:        row.get(3)?,
      value_type:   row.get(4)?,
      timestamp:    row.get(5)?,
    })
  }

  pub fn into_measure(self) -> Result<Measure> {
    Ok(Measure {
      id:           self.id,
      person_id:    self.person_id,
      measure_type: self.measure_type,
      value:        self.value,
      value_type:   self.value_type,
      timestamp:    decode_dt(&self.timestamp)?,
    })
  }
}

/// A measure ready to be bound into an `INSERT`.
pub struct EncodedMeasure {
  pub measure_type: String,
  pub value:        String,
  pub value_type:   Option<String>,
  pub timestamp:    String,
}

impl TryFrom<NewMeasure> for EncodedMeasure {
  type Error = Error;

  fn try_from(m: NewMeasure) -> Result<Self> {
    Ok(Self {
      timestamp:    encode_dt(check_timestamp(m.timestamp)?),
      measure_type: m.measure_type,
      value:        m.value,
      value_type:   m.value_type,
    })
  }
}

pub fn decode_measures(raws: Vec<RawMeasure>) -> Result<Vec<Measure>> {
  raws.into_iter().map(RawMeasure::into_measure).collect()
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;

  use super::*;

  #[test]
  fn timestamps_are_fixed_width() {
    let a = Utc.with_ymd_and_hms(2024, 1, 31, 8, 15, 0).unwrap();
    let b = a + chrono::TimeDelta::milliseconds(250);
    assert_eq!(encode_dt(a), "2024-01-31T08:15:00.000Z");
    assert_eq!(encode_dt(b), "2024-01-31T08:15:00.250Z");
    assert!(encode_dt(a) < encode_dt(b));
    assert_eq!(decode_dt(&encode_dt(b)).unwrap(), b);
  }

  #[test]
  fn far_future_measure_is_not_encoded() {
    let ts = Utc.with_ymd_and_hms(10000, 1, 1, 0, 0, 0).unwrap();
    let err = EncodedMeasure::try_from(NewMeasure::new("weight", "1", ts))
      .err()
      .unwrap();
    assert!(matches!(
      err,
      Error::Core(lifecoach_core::Error::TimestampOutOfRange(_))
    ));
  }

  #[test]
  fn bad_birthdate_column_is_a_core_error() {
    let err = decode_birthdate("31/01/1990").unwrap_err();
    assert!(matches!(
      err,
      Error::Core(lifecoach_core::Error::InvalidBirthDate { .. })
    ));
  }
}
