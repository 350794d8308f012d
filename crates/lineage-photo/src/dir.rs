//! [`PhotoDir`]: the scoped storage area for uploads and thumbnails.
//!
//! Layout: the raw upload for person `n` is `{n}.png` (whatever its real
//! format) and its thumbnail is `{n}_circle.png`.

use std::path::{Path, PathBuf};

use lineage_core::{graph::PhotoLookup, person::PersonId};

use crate::normalize::{circle_path_for, normalize};

#[derive(Debug, Clone)]
pub struct PhotoDir {
  root: PathBuf,
}

impl PhotoDir {
  pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

  pub fn root(&self) -> &Path { &self.root }

  /// Create the directory if it does not exist yet.
  pub fn ensure(&self) -> std::io::Result<()> { std::fs::create_dir_all(&self.root) }

  pub fn raw_path(&self, id: PersonId) -> PathBuf { self.root.join(format!("{id}.png")) }

  pub fn circle_path(&self, id: PersonId) -> PathBuf { circle_path_for(&self.raw_path(id)) }

  /// Store an upload for `id` and produce its thumbnail.
  ///
  /// Returns the thumbnail path to record on the person, or `None` if the
  /// upload was empty or could not be written or normalized.
  pub fn ingest(&self, id: PersonId, bytes: &[u8]) -> Option<PathBuf> {
    if bytes.is_empty() {
      return None;
    }
    let raw = self.raw_path(id);
    if let Err(e) = std::fs::write(&raw, bytes) {
      tracing::warn!(raw = %raw.display(), error = %e, "cannot store uploaded photo");
      return None;
    }
    let thumb = normalize(&raw)?;
    tracing::info!(%id, thumb = %thumb.display(), "stored photo thumbnail");
    Some(thumb)
  }
}

impl PhotoLookup for PhotoDir {
  /// The absolute path of a stored thumbnail, if the file is still there.
  fn resolve(&self, stored: &str) -> Option<PathBuf> {
    let path = Path::new(stored);
    if !path.is_file() {
      return None;
    }
    std::fs::canonicalize(path).ok()
  }
}
