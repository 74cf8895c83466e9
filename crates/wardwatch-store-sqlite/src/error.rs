//! Error type for `wardwatch-store-sqlite`.

use thiserror::Error;
use wardwatch_core::store::DomainError;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] wardwatch_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored enum column holds a value this build does not know.
  #[error("unknown {column} value in database: {value:?}")]
  Decode { column: &'static str, value: String },
}

impl DomainError for Error {
  fn domain(&self) -> Option<&wardwatch_core::Error> {
    match self {
      Self::Core(e) => Some(e),
      _ => None,
    }
  }
}

impl From<rusqlite::Error> for Error {
  fn from(e: rusqlite::Error) -> Self { Self::Database(e.into()) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Whether SQLite rejected a write because of a UNIQUE constraint.
///
/// The store checks uniqueness before inserting; this catches a concurrent
/// writer that slipped in between the check and the write.
pub(crate) fn is_unique_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(f, _)
      if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}
