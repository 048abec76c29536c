//! Image format, size and orientation detection from header bytes.
//!
//! Only the first bytes of a stream are read, never the pixel data:
//!
//! ```no_run
//! let info = imsniff::detect_info_from_file("photo.jpg").unwrap();
//! println!("{} {} rotated by {}", info.image_type, info.size, info.rotation_degrees());
//! ```
//!
//! Use a [`Detector`] to reuse buffers across many images.

pub use crate::generic::*;
pub use crate::limits::Limits;
pub use crate::source::ReplayReader;
pub use crate::traits::{Detail, HeaderParser};
pub use crate::types::{Error, ImageInfo, ImageSize, ImageType, MirrorDirection, Orientation, Result, Rotation};

#[macro_use]
mod macros;
mod generic;
mod limits;
mod source;
mod traits;
mod types;
mod utils;

pub mod common;
pub mod formats;
