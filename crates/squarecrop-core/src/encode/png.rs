//! PNG encoding, the default export format.

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

use super::{check_dimensions, EncodeError};
use crate::render::Surface;

/// Encode the surface as an RGBA PNG.
pub fn encode_png(surface: &Surface) -> Result<Vec<u8>, EncodeError> {
    check_dimensions(surface)?;

    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer)
        .write_image(
            surface.as_bytes(),
            surface.width(),
            surface.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer)
}
