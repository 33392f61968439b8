//! Surface encoding for export.
//!
//! The rendered surface is RGBA. PNG keeps the alpha channel; JPEG has none,
//! so transparent areas are composited over black first, the same result a
//! canvas gives for `toBlob(..., "image/jpeg")`.
//!
//! # Examples
//!
//! ```ignore
//! use squarecrop_core::encode::{encode_surface, ExportFormat};
//!
//! let bytes = encode_surface(&surface, ExportFormat::Png)?;
//! assert_eq!(&bytes[1..4], b"PNG");
//! ```

mod jpeg;
mod png;

pub use jpeg::encode_jpeg;
pub use png::encode_png;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::render::Surface;

/// Default JPEG quality, matching a 0.8 canvas/compressor quality.
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

/// Errors that can occur while encoding a surface.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Nothing has been rendered into the surface.
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The encoder itself failed.
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),
}

/// Output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg {
        /// 1-100, clamped. Defaults to [`DEFAULT_JPEG_QUALITY`] when omitted.
        #[serde(default = "default_jpeg_quality")]
        quality: u8,
    },
}

fn default_jpeg_quality() -> u8 {
    DEFAULT_JPEG_QUALITY
}

impl ExportFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg { .. } => "image/jpeg",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg { .. } => "jpg",
        }
    }
}

/// Encode `surface` in `format`.
pub fn encode_surface(surface: &Surface, format: ExportFormat) -> Result<Vec<u8>, EncodeError> {
    match format {
        ExportFormat::Png => encode_png(surface),
        ExportFormat::Jpeg { quality } => encode_jpeg(surface, quality),
    }
}

fn check_dimensions(surface: &Surface) -> Result<(), EncodeError> {
    if surface.is_empty() {
        return Err(EncodeError::InvalidDimensions {
            width: surface.width(),
            height: surface.height(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;

    #[test]
    fn test_format_metadata() {
        assert_eq!(ExportFormat::Png.mime_type(), "image/png");
        assert_eq!(ExportFormat::Png.extension(), "png");
        let jpeg = ExportFormat::Jpeg { quality: 80 };
        assert_eq!(jpeg.mime_type(), "image/jpeg");
        assert_eq!(jpeg.extension(), "jpg");
        assert_eq!(ExportFormat::default(), ExportFormat::Png);
    }

    #[test]
    fn test_jpeg_quality_defaults_when_omitted() {
        use serde::de::value::{Error as ValueError, MapDeserializer};

        let fields = MapDeserializer::<_, ValueError>::new(vec![("type", "jpeg")].into_iter());
        let format = ExportFormat::deserialize(fields).unwrap();
        assert_eq!(format, ExportFormat::Jpeg { quality: DEFAULT_JPEG_QUALITY });
    }

    #[test]
    fn test_encode_surface_dispatch() {
        let mut surface = Surface::new();
        surface.resize(4, 4, Size::new(4.0, 4.0));

        let png = encode_surface(&surface, ExportFormat::Png).unwrap();
        assert_eq!(&png[0..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);

        let jpeg = encode_surface(&surface, ExportFormat::Jpeg { quality: 90 }).unwrap();
        assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_empty_surface_rejected() {
        let surface = Surface::new();
        assert!(matches!(
            encode_surface(&surface, ExportFormat::Png),
            Err(EncodeError::InvalidDimensions { width: 0, height: 0 })
        ));
    }
}
