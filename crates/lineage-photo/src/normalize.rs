//! Center-crop, scale and circle-mask an image.

use std::path::{Path, PathBuf};

use image::{DynamicImage, GrayImage, ImageFormat, Luma, imageops::FilterType};

use crate::{Error, Result};

/// Width and height of every thumbnail, in pixels.
pub const THUMBNAIL_SIZE: u32 = 200;

const CIRCLE_SUFFIX: &str = "_circle";

/// The thumbnail path derived from a raw upload path: same directory, same
/// stem, `_circle` suffix, always `.png`.
pub fn circle_path_for(raw: &Path) -> PathBuf {
  let stem = raw
    .file_stem()
    .map(|s| s.to_string_lossy().into_owned())
    .unwrap_or_default();
  raw.with_file_name(format!("{stem}{CIRCLE_SUFFIX}.png"))
}

/// A `size`×`size` mask: opaque inside the circle inscribed in the square,
/// transparent outside. Pixels are sampled at their centers.
pub fn circle_mask(size: u32) -> GrayImage {
  let radius = size as f64 / 2.0;
  GrayImage::from_fn(size, size, |x, y| {
    let dx = x as f64 + 0.5 - radius;
    let dy = y as f64 + 0.5 - radius;
    if dx * dx + dy * dy <= radius * radius {
      Luma([u8::MAX])
    } else {
      Luma([0])
    }
  })
}

/// Normalize the image at `raw` into a circular thumbnail next to it.
///
/// The source may be any format `image` can sniff from its bytes, regardless
/// of the file extension.
pub fn try_normalize(raw: &Path) -> Result<PathBuf> {
  let bytes = std::fs::read(raw)?;
  if bytes.is_empty() {
    return Err(Error::Empty);
  }

  let decoded = image::load_from_memory(&bytes).map_err(|source| Error::Decode {
    path: raw.to_path_buf(),
    source,
  })?;

  let rgba = DynamicImage::ImageRgba8(decoded.to_rgba8());
  let (width, height) = (rgba.width(), rgba.height());
  let side = width.min(height);
  if side == 0 {
    return Err(Error::Empty);
  }

  // Crop first so nothing larger than the thumbnail is ever allocated.
  let mut thumb = rgba
    .crop_imm((width - side) / 2, (height - side) / 2, side, side)
    .resize_exact(THUMBNAIL_SIZE, THUMBNAIL_SIZE, FilterType::Triangle)
    .to_rgba8();

  let mask = circle_mask(THUMBNAIL_SIZE);
  for (pixel, alpha) in thumb.pixels_mut().zip(mask.pixels()) {
    pixel[3] = alpha[0];
  }

  let out = circle_path_for(raw);
  thumb
    .save_with_format(&out, ImageFormat::Png)
    .map_err(|source| Error::Encode { path: out.clone(), source })?;

  Ok(out)
}

/// Like [`try_normalize`], but any failure means "no photo".
pub fn normalize(raw: &Path) -> Option<PathBuf> {
  match try_normalize(raw) {
    Ok(path) => Some(path),
    Err(e) => {
      tracing::warn!(raw = %raw.display(), error = %e, "photo normalization failed");
      None
    }
  }
}
