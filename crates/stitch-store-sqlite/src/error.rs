//! Error type for `stitch-store-sqlite`.

use stitch_core::Constraint;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] stitch_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored discriminant did not match any known variant.
  #[error("unknown {kind} value: {value:?}")]
  UnknownVariant { kind: &'static str, value: String },
}

impl Error {
  /// Classify a failed write: UNIQUE violations become
  /// [`stitch_core::Error::Conflict`], anything else stays a database error.
  pub(crate) fn on_unique(e: tokio_rusqlite::Error, constraint: Constraint) -> Self {
    if is_unique_violation(&e) {
      Self::Core(stitch_core::Error::Conflict(constraint))
    } else {
      Self::Database(e)
    }
  }
}

fn is_unique_violation(e: &tokio_rusqlite::Error) -> bool {
  matches!(
    e,
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(f, _))
      if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}

impl From<Error> for stitch_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Core(inner) => inner,
      other => stitch_core::Error::store(other),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
