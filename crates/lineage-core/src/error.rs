//! Error types for `lineage-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("name must not be empty")]
  EmptyName,

  #[error("birth year {year} is outside {min}..={max}")]
  BirthYearOutOfRange { year: i32, min: i32, max: i32 },

  #[error("unknown gender: {0:?}")]
  UnknownGender(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
