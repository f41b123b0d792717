//! Error type for `lifecoach-store-sqlite`.

use lifecoach_core::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] lifecoach_core::Error),

  /// The connection or a transaction failed.
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("person not found: {0}")]
  PersonNotFound(i64),
}

impl StoreError for Error {
  fn is_not_found(&self) -> bool { matches!(self, Error::PersonNotFound(_)) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
