//! Error type for `lineage-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] lineage_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored id that is not a positive integer.
  #[error("invalid stored id: {0}")]
  InvalidId(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
