//! Pixel sampling with nearest, bilinear and Lanczos3 interpolation.
//!
//! Samplers take continuous coordinates on the pixel grid, where `(0, 0)`
//! is the center of the top-left pixel. Texels outside the image read as
//! transparent, so the edges of a rotated or shrunk image fade out the
//! way a canvas draw does.
//!
//! Interpolation happens on premultiplied alpha and is converted back to
//! straight RGBA on the way out.
//!
//! When a destination pixel covers more than one source pixel (zooming
//! out, or drawing a large source into a small surface) the kernel is
//! stretched by that footprint so every covered texel contributes. A point
//! sample would skip texels and alias fine detail into stripes.

use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// Interpolation filter used when resampling the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InterpolationFilter {
    /// No smoothing.
    Nearest,
    /// Fast bilinear interpolation.
    Bilinear,
    /// High-quality Lanczos3 interpolation.
    #[default]
    Lanczos3,
}

/// Coordinates closer than this to a pixel center are read directly.
const SNAP_EPSILON: f64 = 1e-9;

/// Footprints at or below this are treated as magnification.
const MINIFY_THRESHOLD: f64 = 1.0 + 1e-9;

/// Sample the image at grid position `(x, y)` with `filter`.
///
/// `footprint` is the size, in source pixels, of one destination pixel.
#[inline]
pub(crate) fn sample(
    image: &RgbaImage,
    x: f64,
    y: f64,
    filter: InterpolationFilter,
    footprint: f64,
) -> [u8; 4] {
    if footprint > MINIFY_THRESHOLD {
        return match filter {
            InterpolationFilter::Nearest => sample_nearest(image, x, y),
            InterpolationFilter::Bilinear => sample_tent(image, x, y, footprint),
            InterpolationFilter::Lanczos3 => sample_lanczos3_wide(image, x, y, footprint),
        };
    }
    if let Some(px) = exact_texel(image, x, y) {
        return px;
    }
    match filter {
        InterpolationFilter::Nearest => sample_nearest(image, x, y),
        InterpolationFilter::Bilinear => sample_bilinear(image, x, y),
        InterpolationFilter::Lanczos3 => sample_lanczos3(image, x, y),
    }
}

/// Direct read when `(x, y)` sits on a pixel center.
fn exact_texel(image: &RgbaImage, x: f64, y: f64) -> Option<[u8; 4]> {
    let rx = x.round();
    let ry = y.round();
    if (x - rx).abs() > SNAP_EPSILON || (y - ry).abs() > SNAP_EPSILON {
        return None;
    }
    if rx < 0.0 || ry < 0.0 || rx >= image.width() as f64 || ry >= image.height() as f64 {
        return None;
    }
    Some(image.get_pixel(rx as u32, ry as u32).0)
}

/// Premultiplied texel as f64, transparent outside the image.
#[inline]
fn texel(image: &RgbaImage, px: i64, py: i64) -> [f64; 4] {
    if px < 0 || py < 0 || px >= image.width() as i64 || py >= image.height() as i64 {
        return [0.0; 4];
    }
    let [r, g, b, a] = image.get_pixel(px as u32, py as u32).0;
    let alpha = a as f64 / 255.0;
    [r as f64 * alpha, g as f64 * alpha, b as f64 * alpha, a as f64]
}

/// Convert accumulated premultiplied values back to straight RGBA8.
#[inline]
fn unpremultiply(sum: [f64; 4]) -> [u8; 4] {
    let a = sum[3].clamp(0.0, 255.0);
    if a < 0.5 {
        return [0, 0, 0, 0];
    }
    let scale = 255.0 / a;
    [
        (sum[0] * scale).clamp(0.0, 255.0).round() as u8,
        (sum[1] * scale).clamp(0.0, 255.0).round() as u8,
        (sum[2] * scale).clamp(0.0, 255.0).round() as u8,
        a.round() as u8,
    ]
}

fn sample_nearest(image: &RgbaImage, x: f64, y: f64) -> [u8; 4] {
    let px = x.round() as i64;
    let py = y.round() as i64;
    if px < 0 || py < 0 || px >= image.width() as i64 || py >= image.height() as i64 {
        return [0, 0, 0, 0];
    }
    image.get_pixel(px as u32, py as u32).0
}

/// Bilinear interpolation over the 4 nearest pixels.
fn sample_bilinear(image: &RgbaImage, x: f64, y: f64) -> [u8; 4] {
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let p00 = texel(image, x0, y0);
    let p10 = texel(image, x0 + 1, y0);
    let p01 = texel(image, x0, y0 + 1);
    let p11 = texel(image, x0 + 1, y0 + 1);

    let mut sum = [0.0f64; 4];
    for i in 0..4 {
        sum[i] = p00[i] * (1.0 - fx) * (1.0 - fy)
            + p10[i] * fx * (1.0 - fy)
            + p01[i] * (1.0 - fx) * fy
            + p11[i] * fx * fy;
    }
    unpremultiply(sum)
}

/// Lanczos3 interpolation over a 6x6 neighborhood.
///
/// Near the image border the kernel would straddle transparent texels and
/// ring, so those positions fall back to bilinear.
fn sample_lanczos3(image: &RgbaImage, x: f64, y: f64) -> [u8; 4] {
    let (w, h) = (image.width() as i64, image.height() as i64);
    if x < 2.0 || x >= (w - 3) as f64 || y < 2.0 || y >= (h - 3) as f64 {
        return sample_bilinear(image, x, y);
    }

    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;

    let mut sum = [0.0f64; 4];
    let mut weight_sum = 0.0;

    for ky in -2..=3 {
        let py = y0 + ky;
        let wy = lanczos_weight(y - py as f64, 3.0);
        for kx in -2..=3 {
            let px = x0 + kx;
            let weight = lanczos_weight(x - px as f64, 3.0) * wy;
            let t = texel(image, px, py);
            for i in 0..4 {
                sum[i] += t[i] * weight;
            }
            weight_sum += weight;
        }
    }

    if weight_sum.abs() < f64::EPSILON {
        return [0, 0, 0, 0];
    }
    for v in &mut sum {
        *v /= weight_sum;
    }
    unpremultiply(sum)
}

/// Bilinear stretched to a tent of radius `footprint`.
fn sample_tent(image: &RgbaImage, x: f64, y: f64, footprint: f64) -> [u8; 4] {
    sample_separable(image, x, y, footprint, footprint, |t| (1.0 - t.abs()).max(0.0))
}

/// Lanczos3 stretched by `footprint`, tent near the border.
fn sample_lanczos3_wide(image: &RgbaImage, x: f64, y: f64, footprint: f64) -> [u8; 4] {
    let (w, h) = (image.width() as f64, image.height() as f64);
    let reach = 3.0 * footprint;
    if x < reach || x >= w - 1.0 - reach || y < reach || y >= h - 1.0 - reach {
        return sample_tent(image, x, y, footprint);
    }
    sample_separable(image, x, y, reach, footprint, |t| lanczos_weight(t, 3.0))
}

/// Weighted sum over texels within `reach` of `(x, y)`, with weights
/// `kernel(dx / stretch) * kernel(dy / stretch)`.
fn sample_separable(
    image: &RgbaImage,
    x: f64,
    y: f64,
    reach: f64,
    stretch: f64,
    kernel: impl Fn(f64) -> f64,
) -> [u8; 4] {
    let (x_start, x_end) = ((x - reach).ceil() as i64, (x + reach).floor() as i64);
    let (y_start, y_end) = ((y - reach).ceil() as i64, (y + reach).floor() as i64);
    let x_weights: Vec<f64> = (x_start..=x_end)
        .map(|px| kernel((x - px as f64) / stretch))
        .collect();

    let mut sum = [0.0f64; 4];
    let mut weight_sum = 0.0;
    for py in y_start..=y_end {
        let wy = kernel((y - py as f64) / stretch);
        if wy == 0.0 {
            continue;
        }
        for (px, wx) in (x_start..=x_end).zip(&x_weights) {
            let weight = wx * wy;
            let t = texel(image, px, py);
            for i in 0..4 {
                sum[i] += t[i] * weight;
            }
            weight_sum += weight;
        }
    }

    if weight_sum.abs() < f64::EPSILON {
        return [0, 0, 0, 0];
    }
    for v in &mut sum {
        *v /= weight_sum;
    }
    unpremultiply(sum)
}

/// Lanczos kernel: `sinc(x) * sinc(x / a)` for `|x| < a`, else 0.
fn lanczos_weight(x: f64, a: f64) -> f64 {
    if x.abs() < f64::EPSILON {
        return 1.0;
    }
    if x.abs() >= a {
        return 0.0;
    }

    let pi_x = std::f64::consts::PI * x;
    let pi_x_a = pi_x / a;
    (a * pi_x.sin() * pi_x_a.sin()) / (pi_x * pi_x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            let v = ((x + y) * 8) as u8;
            Rgba([v, v, v, 255])
        })
    }

    #[test]
    fn test_exact_texel_all_filters() {
        let img = gradient(10, 10);
        for filter in [
            InterpolationFilter::Nearest,
            InterpolationFilter::Bilinear,
            InterpolationFilter::Lanczos3,
        ] {
            assert_eq!(sample(&img, 4.0, 5.0, filter, 1.0), [72, 72, 72, 255]);
        }
    }

    #[test]
    fn test_outside_is_transparent() {
        let img = gradient(10, 10);
        assert_eq!(sample(&img, -5.0, 3.0, InterpolationFilter::Bilinear, 1.0), [0, 0, 0, 0]);
        assert_eq!(sample(&img, 3.0, 20.0, InterpolationFilter::Nearest, 1.0), [0, 0, 0, 0]);
        assert_eq!(sample(&img, 30.5, 3.5, InterpolationFilter::Lanczos3, 1.0), [0, 0, 0, 0]);
    }

    #[test]
    fn test_bilinear_midpoint() {
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, Rgba([0, 0, 0, 255]));
        img.put_pixel(1, 0, Rgba([200, 100, 50, 255]));
        assert_eq!(
            sample(&img, 0.5, 0.0, InterpolationFilter::Bilinear, 1.0),
            [100, 50, 25, 255]
        );
    }

    #[test]
    fn test_bilinear_edge_fades_alpha_keeps_color() {
        let img = RgbaImage::from_pixel(4, 4, Rgba([200, 10, 10, 255]));
        let px = sample(&img, -0.5, 1.0, InterpolationFilter::Bilinear, 1.0);
        // Half covered: alpha halves, color stays (no dark fringe)
        assert_eq!(px[3], 128);
        assert_eq!(&px[0..3], &[200, 10, 10]);
    }

    #[test]
    fn test_lanczos_uniform_region() {
        let img = RgbaImage::from_pixel(20, 20, Rgba([90, 120, 150, 255]));
        assert_eq!(
            sample(&img, 9.37, 10.71, InterpolationFilter::Lanczos3, 1.0),
            [90, 120, 150, 255]
        );
    }

    #[test]
    fn test_lanczos_weight() {
        assert_eq!(lanczos_weight(0.0, 3.0), 1.0);
        assert_eq!(lanczos_weight(3.0, 3.0), 0.0);
        assert!(lanczos_weight(1.0, 3.0).abs() < 1e-12);
        assert!(lanczos_weight(0.5, 3.0) > 0.5);
    }

    #[test]
    fn test_nearest_rounds() {
        let img = gradient(10, 10);
        assert_eq!(
            sample(&img, 2.4, 2.6, InterpolationFilter::Nearest, 1.0),
            img.get_pixel(2, 3).0
        );
    }

    /// One white column every 4 pixels, black elsewhere.
    fn stripes(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, _| {
            if x % 4 == 0 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 255])
            }
        })
    }

    #[test]
    fn test_tent_averages_stripes_when_minifying() {
        let img = stripes(64, 64);
        for x in [20.0, 21.5, 22.25, 23.0] {
            let px = sample(&img, x, 30.5, InterpolationFilter::Bilinear, 4.0);
            assert_eq!(px, [64, 64, 64, 255], "x = {x}");
        }
    }

    #[test]
    fn test_lanczos_averages_stripes_when_minifying() {
        let img = stripes(64, 64);
        for x in [20.0, 25.5, 30.25, 37.0] {
            let px = sample(&img, x, 31.5, InterpolationFilter::Lanczos3, 4.0);
            assert!((px[0] as i32 - 64).abs() <= 6, "x = {x}: {px:?}");
            assert_eq!(px[3], 255);
        }
    }

    #[test]
    fn test_minify_skips_exact_texel() {
        // Sitting on a white column still blends in the black neighbors
        let img = stripes(64, 64);
        let px = sample(&img, 32.0, 32.0, InterpolationFilter::Bilinear, 4.0);
        assert_eq!(px, [64, 64, 64, 255]);
    }
}
