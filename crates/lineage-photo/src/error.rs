//! Error types for the photo normalizer.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("empty upload")]
  Empty,

  #[error("cannot decode {}: {source}", .path.display())]
  Decode {
    path:   PathBuf,
    #[source]
    source: image::ImageError,
  },

  #[error("cannot encode {}: {source}", .path.display())]
  Encode {
    path:   PathBuf,
    #[source]
    source: image::ImageError,
  },

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
