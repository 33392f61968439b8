//! Format-sniffing decode with EXIF orientation handling.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{ImageError, ImageReader, RgbaImage};
use tracing::debug;

use super::{DecodeError, Orientation};

/// Decode image bytes to RGBA, applying EXIF orientation correction.
///
/// # Errors
///
/// Returns `DecodeError::Empty` for zero bytes,
/// `DecodeError::InvalidFormat` if the format cannot be recognized and
/// `DecodeError::CorruptedFile` if decoding fails partway.
pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage, DecodeError> {
    let orientation = get_orientation(bytes);
    let img = decode_dynamic(bytes)?;
    let img = orientation.apply(img).into_rgba8();

    debug!(
        width = img.width(),
        height = img.height(),
        orientation = ?orientation,
        "squarecrop.decode"
    );
    Ok(img)
}

/// Decode image bytes to RGBA without applying EXIF orientation.
pub fn decode_image_no_orientation(bytes: &[u8]) -> Result<RgbaImage, DecodeError> {
    Ok(decode_dynamic(bytes)?.into_rgba8())
}

/// Read the EXIF orientation tag.
///
/// Returns `Orientation::Normal` if there is no EXIF data or the tag is missing.
pub fn get_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);
    match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Orientation::from)
            .unwrap_or_default(),
        Err(_) => Orientation::Normal,
    }
}

fn decode_dynamic(bytes: &[u8]) -> Result<image::DynamicImage, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;
    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }

    reader.decode().map_err(|e| match e {
        ImageError::Unsupported(_) => DecodeError::InvalidFormat,
        other => DecodeError::CorruptedFile(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba};

    fn encoded(img: &RgbaImage, format: ImageFormat) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    fn checker(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 128])
            }
        })
    }

    /// JPEG bytes with an APP1 Exif segment holding just an Orientation tag.
    fn jpeg_with_orientation(img: &image::RgbImage, orientation: u16) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Jpeg).unwrap();
        let jpeg = out.into_inner();

        // Big-endian TIFF header, IFD0 at offset 8 with a single SHORT entry
        let mut tiff = b"MM\0\x2a\0\0\0\x08".to_vec();
        tiff.extend_from_slice(&1u16.to_be_bytes());
        tiff.extend_from_slice(&0x0112u16.to_be_bytes());
        tiff.extend_from_slice(&3u16.to_be_bytes());
        tiff.extend_from_slice(&1u32.to_be_bytes());
        tiff.extend_from_slice(&orientation.to_be_bytes());
        tiff.extend_from_slice(&[0, 0]);
        tiff.extend_from_slice(&0u32.to_be_bytes());

        let mut app1 = b"Exif\0\0".to_vec();
        app1.extend_from_slice(&tiff);

        let mut bytes = jpeg[..2].to_vec();
        bytes.extend_from_slice(&[0xFF, 0xE1]);
        bytes.extend_from_slice(&((app1.len() + 2) as u16).to_be_bytes());
        bytes.extend_from_slice(&app1);
        bytes.extend_from_slice(&jpeg[2..]);
        bytes
    }

    /// Left half red, right half blue.
    fn red_blue(width: u32, height: u32) -> image::RgbImage {
        image::RgbImage::from_fn(width, height, |x, _| {
            if x < width / 2 {
                image::Rgb([255, 0, 0])
            } else {
                image::Rgb([0, 0, 255])
            }
        })
    }

    fn is_red(px: &Rgba<u8>) -> bool {
        px.0[0] > 200 && px.0[2] < 60
    }

    fn is_blue(px: &Rgba<u8>) -> bool {
        px.0[2] > 200 && px.0[0] < 60
    }

    #[test]
    fn test_decode_jpeg_applies_exif_rotation() {
        let bytes = jpeg_with_orientation(&red_blue(32, 16), 6);
        assert_eq!(get_orientation(&bytes), Orientation::Rotate90CW);

        let upright = decode_image(&bytes).unwrap();
        assert_eq!(upright.dimensions(), (16, 32));
        // A clockwise quarter turn moves the left half to the top
        assert!(is_red(upright.get_pixel(8, 4)), "{:?}", upright.get_pixel(8, 4));
        assert!(is_blue(upright.get_pixel(8, 27)), "{:?}", upright.get_pixel(8, 27));

        let stored = decode_image_no_orientation(&bytes).unwrap();
        assert_eq!(stored.dimensions(), (32, 16));
        assert!(is_red(stored.get_pixel(4, 8)));
    }

    #[test]
    fn test_decode_jpeg_normal_orientation_tag() {
        let bytes = jpeg_with_orientation(&red_blue(32, 16), 1);
        assert_eq!(get_orientation(&bytes), Orientation::Normal);
        assert_eq!(decode_image(&bytes).unwrap().dimensions(), (32, 16));
    }

    #[test]
    fn test_decode_png_keeps_alpha() {
        let img = checker(6, 4);
        let decoded = decode_image(&encoded(&img, ImageFormat::Png)).unwrap();
        assert_eq!(decoded, img);
    }

    #[test]
    fn test_decode_bmp() {
        let img = RgbaImage::from_pixel(3, 5, Rgba([10, 20, 30, 255]));
        let decoded = decode_image(&encoded(&img, ImageFormat::Bmp)).unwrap();
        assert_eq!(decoded.dimensions(), (3, 5));
        assert_eq!(decoded.get_pixel(1, 1).0, [10, 20, 30, 255]);
    }

    #[test]
    fn test_decode_jpeg_is_opaque() {
        let rgb = image::RgbImage::from_pixel(8, 8, image::Rgb([128, 128, 128]));
        let mut out = Cursor::new(Vec::new());
        rgb.write_to(&mut out, ImageFormat::Jpeg).unwrap();

        let decoded = decode_image(&out.into_inner()).unwrap();
        assert_eq!(decoded.dimensions(), (8, 8));
        assert!(decoded.pixels().all(|p| p.0[3] == 255));
    }

    #[test]
    fn test_decode_empty() {
        assert!(matches!(decode_image(&[]), Err(DecodeError::Empty)));
    }

    #[test]
    fn test_decode_unknown_format() {
        let result = decode_image(&[0x00, 0x01, 0x02, 0x03]);
        assert!(matches!(result, Err(DecodeError::InvalidFormat)));
    }

    #[test]
    fn test_decode_truncated_png() {
        let bytes = encoded(&checker(16, 16), ImageFormat::Png);
        let result = decode_image(&bytes[..bytes.len() / 2]);
        assert!(matches!(result, Err(DecodeError::CorruptedFile(_))));
    }

    #[test]
    fn test_orientation_without_exif() {
        let bytes = encoded(&checker(2, 2), ImageFormat::Png);
        assert_eq!(get_orientation(&bytes), Orientation::Normal);
        assert_eq!(get_orientation(&[0x00, 0x01]), Orientation::Normal);
    }

    #[test]
    fn test_no_orientation_variant() {
        let img = checker(5, 3);
        let decoded = decode_image_no_orientation(&encoded(&img, ImageFormat::Png)).unwrap();
        assert_eq!(decoded, img);
    }
}
