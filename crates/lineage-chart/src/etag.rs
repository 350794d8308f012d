//! ETag computation for rendered charts.
//!
//! ETags are SHA-256 hashes over the output format and the DOT source. The
//! DOT text fully determines the image, so equal DOT means an equal chart.

use sha2::{Digest, Sha256};

use crate::render::ChartFormat;

/// Compute the quoted ETag for `dot` rendered as `format`.
pub fn chart_etag(dot: &str, format: ChartFormat) -> String {
  let mut hasher = Sha256::new();
  hasher.update(format.extension().as_bytes());
  hasher.update([0u8]);
  hasher.update(dot.as_bytes());
  let hash = hasher.finalize();
  format!("\"{}\"", hex::encode(hash))
}
