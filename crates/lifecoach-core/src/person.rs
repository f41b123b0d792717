//! Person, the record at the centre of the store.
//!
//! A person carries identity and profile fields plus a materialised view of
//! their current health: the latest [`Measure`] of every measure type they
//! own.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  measure::{Measure, NewMeasure},
};

// ─── Birth date ──────────────────────────────────────────────────────────────

/// `chrono` format string for birth dates (`yyyy-MM-dd`).
pub const BIRTH_DATE_FORMAT: &str = "%Y-%m-%d";

/// A calendar date that always round-trips through `yyyy-MM-dd`.
///
/// Parsing is strict: the input must be exactly ten characters with
/// zero-padded fields and name a real date. `"2020-1-5"` and `"2020-13-40"`
/// are both rejected.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
  Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct BirthDate(NaiveDate);

impl BirthDate {
  pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
    NaiveDate::from_ymd_opt(year, month, day).map(Self)
  }

  pub fn date(&self) -> NaiveDate { self.0 }
}

impl From<NaiveDate> for BirthDate {
  fn from(date: NaiveDate) -> Self { Self(date) }
}

impl FromStr for BirthDate {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let invalid = || Error::InvalidBirthDate { input: s.to_owned() };

    if s.len() != 10 {
      return Err(invalid());
    }
    let date =
      NaiveDate::parse_from_str(s, BIRTH_DATE_FORMAT).map_err(|_| invalid())?;

    // chrono tolerates unpadded fields when parsing.
    if date.format(BIRTH_DATE_FORMAT).to_string() != s {
      return Err(invalid());
    }
    Ok(Self(date))
  }
}

impl fmt::Display for BirthDate {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0.format(BIRTH_DATE_FORMAT))
  }
}

impl TryFrom<String> for BirthDate {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { s.parse() }
}

impl From<BirthDate> for String {
  fn from(d: BirthDate) -> Self { d.to_string() }
}

// ─── Person ──────────────────────────────────────────────────────────────────

/// A stored person, as materialised by a [`PersonStore`](crate::store::PersonStore).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
  /// Assigned by the store on creation; never changes afterwards.
  pub id:             i64,
  pub first_name:     String,
  pub last_name:      String,
  /// Internal only; excluded from every external representation.
  pub username:       String,
  pub birthdate:      BirthDate,
  /// Internal only; excluded from every external representation.
  pub email:          String,
  /// Latest measure per measure type, loaded whenever the person is read.
  #[serde(default)]
  pub current_health: Vec<Measure>,
}

impl Person {
  /// The birth date as a `yyyy-MM-dd` string.
  pub fn birthdate_string(&self) -> String { self.birthdate.to_string() }

  /// Replace the birth date from a `yyyy-MM-dd` string.
  ///
  /// On error the existing birth date is left untouched.
  pub fn set_birthdate(&mut self, s: &str) -> Result<()> {
    self.birthdate = s.parse()?;
    Ok(())
  }
}

// ─── Input ───────────────────────────────────────────────────────────────────

/// Input to [`PersonStore::save`](crate::store::PersonStore::save).
///
/// `measures` are inserted in the same transaction as the person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPerson {
  pub first_name: String,
  pub last_name:  String,
  #[serde(default)]
  pub username:   String,
  pub birthdate:  BirthDate,
  #[serde(default)]
  pub email:      String,
  #[serde(default)]
  pub measures:   Vec<NewMeasure>,
}

impl NewPerson {
  /// Convenience constructor with username, email and measures left empty.
  pub fn new(
    first_name: impl Into<String>,
    last_name: impl Into<String>,
    birthdate: BirthDate,
  ) -> Self {
    Self {
      first_name: first_name.into(),
      last_name: last_name.into(),
      username: String::new(),
      birthdate,
      email: String::new(),
      measures: Vec::new(),
    }
  }
}
