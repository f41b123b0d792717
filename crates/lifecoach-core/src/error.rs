//! Error types for `lifecoach-core`.

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A birth date string did not match `yyyy-MM-dd`.
  #[error("invalid birth date {input:?}: expected yyyy-MM-dd")]
  InvalidBirthDate { input: String },

  /// A measure timestamp falls outside years 0000 to 9999.
  #[error("timestamp {0} is outside the supported years 0000 to 9999")]
  TimestampOutOfRange(DateTime<Utc>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
