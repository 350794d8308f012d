//! Circular photo thumbnails for Lineage chart nodes.
//!
//! Converts an arbitrary uploaded image into a 200×200 RGBA thumbnail whose
//! corners are transparent, and owns the on-disk layout of the photo
//! directory. Pure synchronous; callers on an async runtime should run
//! [`PhotoDir::ingest`] on a blocking thread.
//!
//! # Quick start
//!
//! ```no_run
//! use lineage_core::person::PersonId;
//! use lineage_photo::PhotoDir;
//!
//! let photos = PhotoDir::new("photos");
//! photos.ensure().unwrap();
//! let bytes = std::fs::read("upload.jpg").unwrap();
//! let thumb = photos.ingest(PersonId(1), &bytes);
//! println!("thumbnail: {thumb:?}");
//! ```

mod dir;
pub mod error;
mod normalize;

pub use dir::PhotoDir;
pub use error::{Error, Result};
pub use normalize::{THUMBNAIL_SIZE, circle_mask, circle_path_for, normalize, try_normalize};
