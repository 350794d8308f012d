//! Error types for chart rendering.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("cannot start renderer `{}`: {source}", .program.display())]
  Spawn {
    program: PathBuf,
    #[source]
    source:  std::io::Error,
  },

  #[error("renderer io error: {0}")]
  Io(#[from] std::io::Error),

  /// The backend ran but refused the input.
  #[error("renderer rejected the chart (exit={status:?}): {stderr}")]
  Rejected { status: Option<i32>, stderr: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
