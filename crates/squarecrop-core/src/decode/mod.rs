//! Image decoding for squarecrop.
//!
//! Turns the bytes of a user-selected file into an RGBA source bitmap,
//! oriented the way a browser `<img>` element displays it.
//!
//! # Supported Formats
//!
//! PNG, JPEG, GIF (first frame), WebP and BMP, detected from the bytes
//! rather than the file name.

mod raster;
mod orientation;

pub use raster::{decode_image, decode_image_no_orientation, get_orientation};
pub use orientation::Orientation;

use thiserror::Error;

/// Error types for image decoding operations.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// No bytes were provided.
    #[error("Empty image data")]
    Empty,

    /// The file format is not recognized or supported.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// The image file is corrupted or incomplete.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),
}
