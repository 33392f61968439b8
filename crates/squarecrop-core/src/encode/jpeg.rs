//! JPEG encoding with configurable quality.

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};

use super::{check_dimensions, EncodeError};
use crate::render::Surface;

/// Encode the surface as JPEG.
///
/// `quality` is clamped to 1-100. Alpha is composited over black.
///
/// # Quality Guidelines
///
/// * 90-100: High quality, suitable for further editing
/// * 80-90: Good quality, recommended for most uses (default: 80)
/// * 60-80: Medium quality, acceptable for web/social media
/// * Below 60: Low quality, visible artifacts
pub fn encode_jpeg(surface: &Surface, quality: u8) -> Result<Vec<u8>, EncodeError> {
    check_dimensions(surface)?;

    let rgb = flatten_over_black(surface.as_bytes());
    let quality = quality.clamp(1, 100);

    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality)
        .write_image(&rgb, surface.width(), surface.height(), ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer)
}

/// Drop the alpha channel, scaling color by coverage.
fn flatten_over_black(rgba: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
    for px in rgba.chunks_exact(4) {
        let alpha = px[3] as u32;
        for &c in &px[..3] {
            rgb.push(((c as u32 * alpha + 127) / 255) as u8);
        }
    }
    rgb
}
