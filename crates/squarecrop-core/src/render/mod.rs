//! Render core: draws the completed crop of a source image into a surface.
//!
//! The crop rectangle is picked on the *displayed* image, which the browser
//! may have shrunk to fit the layout and which is shown under a
//! `scale(s) rotate(r)` CSS transform. Rendering undoes all of that so the
//! output holds the same region at the source's native resolution.
//!
//! # Transform Chain
//!
//! The chain is built the way a 2D canvas context would be driven, each
//! step post-multiplied onto the current transform:
//!
//! 1. Scale by the device pixel ratio
//! 2. (display resolution only) scale by `1 / (natural / displayed)`
//! 3. Translate by `(-x * scaleX, -y * scaleY)` so the crop corner is the origin
//! 4. Translate to the image center, rotate, scale uniformly, translate back
//!
//! The source is then drawn at its natural size. Drawing is done by inverse
//! mapping: every destination pixel center is pushed back through the
//! inverted chain and the source is sampled there.

mod sample;
mod surface;

pub use sample::InterpolationFilter;
pub use surface::Surface;

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::affine::Affine;
use crate::geometry::{CropRect, Size};
use crate::tracker::Transform;

/// Largest surface side a browser canvas accepts.
pub const MAX_SURFACE_SIDE: u32 = 32_767;

/// Largest surface area a browser canvas accepts.
pub const MAX_SURFACE_PIXELS: u64 = 268_435_456;

/// Errors for calls that break the render preconditions.
#[derive(Debug, Error, PartialEq)]
pub enum RenderError {
    /// The source image has no pixels yet.
    #[error("Source image is not decoded (natural size is {width}x{height})")]
    SourceNotDecoded { width: u32, height: u32 },

    /// The displayed size is zero or not a number.
    #[error("Invalid display size {width}x{height}")]
    InvalidDisplaySize { width: f64, height: f64 },

    /// Scale must be positive and finite.
    #[error("Invalid scale {0}: must be positive and finite")]
    InvalidScale(f64),

    /// Rotation must be finite.
    #[error("Invalid rotation {0}: must be finite")]
    InvalidRotation(f64),

    /// Device pixel ratio must be positive and finite.
    #[error("Invalid device pixel ratio {0}")]
    InvalidPixelRatio(f64),

    /// The crop has a coordinate that is not a number or infinite.
    #[error("Invalid crop {x},{y} {width}x{height}: coordinates must be finite")]
    InvalidCrop {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },

    /// The requested output would not fit in a canvas.
    #[error("Surface {width}x{height} exceeds the maximum canvas size")]
    SurfaceTooLarge { width: u64, height: u64 },
}

/// Resolution the output surface is rendered at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputResolution {
    /// One surface pixel per source pixel (times the device pixel ratio).
    #[default]
    Natural,
    /// One surface pixel per display pixel (times the device pixel ratio).
    Display,
}

/// Knobs that are not part of the user's crop state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Physical pixels per logical pixel on the user's screen.
    pub device_pixel_ratio: f64,
    /// Resampling filter. Lanczos3 matches a canvas at high smoothing quality.
    pub filter: InterpolationFilter,
    pub resolution: OutputResolution,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            device_pixel_ratio: 1.0,
            filter: InterpolationFilter::default(),
            resolution: OutputResolution::default(),
        }
    }
}

/// A decoded source bitmap together with the size it is displayed at.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pixels: RgbaImage,
    display: Size,
}

impl SourceImage {
    pub fn new(pixels: RgbaImage, display: Size) -> Self {
        Self { pixels, display }
    }

    /// A source shown at exactly its natural size.
    pub fn at_natural_size(pixels: RgbaImage) -> Self {
        let display = Size::new(pixels.width() as f64, pixels.height() as f64);
        Self { pixels, display }
    }

    pub fn natural_width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn natural_height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn display_size(&self) -> Size {
        self.display
    }

    /// Update the displayed size after a layout change.
    pub fn set_display_size(&mut self, display: Size) {
        self.display = display;
    }

    /// `(naturalWidth / displayWidth, naturalHeight / displayHeight)`.
    pub fn natural_ratio(&self) -> (f64, f64) {
        (
            self.pixels.width() as f64 / self.display.width,
            self.pixels.height() as f64 / self.display.height,
        )
    }

    pub fn image(&self) -> &RgbaImage {
        &self.pixels
    }
}

/// Result of a render call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The surface was resized and redrawn.
    Rendered { width: u32, height: u32 },
    /// The crop had no area; the surface was left alone.
    Skipped,
}

/// Everything needed to draw, computed before touching the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderPlan {
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
    /// Surface size in display units (the crop size).
    pub logical: Size,
    /// Maps natural source coordinates to surface pixel coordinates.
    pub to_surface: Affine,
}

/// Validate inputs and build the transform chain.
///
/// Returns `Ok(None)` for a crop without area.
pub fn plan_render(
    source: &SourceImage,
    crop: &CropRect,
    transform: &Transform,
    options: &RenderOptions,
) -> Result<Option<RenderPlan>, RenderError> {
    let (natural_w, natural_h) = (source.natural_width(), source.natural_height());
    if natural_w == 0 || natural_h == 0 {
        return Err(RenderError::SourceNotDecoded {
            width: natural_w,
            height: natural_h,
        });
    }
    let display = source.display_size();
    if !display.is_valid() {
        return Err(RenderError::InvalidDisplaySize {
            width: display.width,
            height: display.height,
        });
    }
    if !transform.scale.is_finite() || transform.scale <= 0.0 {
        return Err(RenderError::InvalidScale(transform.scale));
    }
    if !transform.rotate.is_finite() {
        return Err(RenderError::InvalidRotation(transform.rotate));
    }
    let dpr = options.device_pixel_ratio;
    if !dpr.is_finite() || dpr <= 0.0 {
        return Err(RenderError::InvalidPixelRatio(dpr));
    }

    if ![crop.x, crop.y, crop.width, crop.height]
        .iter()
        .all(|v| v.is_finite())
    {
        return Err(RenderError::InvalidCrop {
            x: crop.x,
            y: crop.y,
            width: crop.width,
            height: crop.height,
        });
    }
    if crop.is_degenerate() {
        return Ok(None);
    }

    let (scale_x, scale_y) = source.natural_ratio();
    let (density_x, density_y) = match options.resolution {
        OutputResolution::Natural => (scale_x * dpr, scale_y * dpr),
        OutputResolution::Display => (dpr, dpr),
    };

    let width = (crop.width * density_x).floor();
    let height = (crop.height * density_y).floor();
    if width < 1.0 || height < 1.0 {
        return Ok(None);
    }
    let (width, height) = (width as u64, height as u64);
    if width > MAX_SURFACE_SIDE as u64
        || height > MAX_SURFACE_SIDE as u64
        || width * height > MAX_SURFACE_PIXELS
    {
        return Err(RenderError::SurfaceTooLarge { width, height });
    }

    let center_x = natural_w as f64 / 2.0;
    let center_y = natural_h as f64 / 2.0;

    let mut ctm = Affine::identity().scale(dpr, dpr);
    if options.resolution == OutputResolution::Display {
        ctm = ctm.scale(1.0 / scale_x, 1.0 / scale_y);
    }
    let ctm = ctm
        .translate(-crop.x * scale_x, -crop.y * scale_y)
        .translate(center_x, center_y)
        .rotate_degrees(transform.normalized_rotation())
        .scale(transform.scale, transform.scale)
        .translate(-center_x, -center_y);

    Ok(Some(RenderPlan {
        width: width as u32,
        height: height as u32,
        logical: Size::new(crop.width, crop.height),
        to_surface: ctm,
    }))
}

/// Draw `crop` of `source` into `surface` under `transform`.
///
/// A degenerate crop is a no-op that leaves `surface` untouched. Otherwise
/// the surface is resized (and so cleared) and fully redrawn; calling this
/// twice with the same inputs gives identical pixels.
pub fn render(
    source: &SourceImage,
    surface: &mut Surface,
    crop: &CropRect,
    transform: &Transform,
    options: &RenderOptions,
) -> Result<RenderOutcome, RenderError> {
    let plan = match plan_render(source, crop, transform, options) {
        Ok(Some(plan)) => plan,
        Ok(None) => {
            debug!(
                width = crop.width,
                height = crop.height,
                "squarecrop.render.skipped"
            );
            return Ok(RenderOutcome::Skipped);
        }
        Err(e) => {
            warn!(error = %e, "squarecrop.render.rejected");
            return Err(e);
        }
    };

    // The chain maps source to surface; drawing needs the way back.
    // Scale and pixel ratio are checked above, so the chain is invertible.
    let Some(to_source) = plan.to_surface.invert() else {
        return Err(RenderError::InvalidScale(transform.scale));
    };

    surface.resize(plan.width, plan.height, plan.logical);
    draw(source.image(), surface.image_mut(), &to_source, options.filter);

    debug!(
        width = plan.width,
        height = plan.height,
        scale = transform.scale,
        rotate = transform.rotate,
        "squarecrop.render"
    );
    Ok(RenderOutcome::Rendered {
        width: plan.width,
        height: plan.height,
    })
}

/// Fill every pixel of `dst` by sampling `src` at the inverse-mapped center.
fn draw(src: &RgbaImage, dst: &mut RgbaImage, to_source: &Affine, filter: InterpolationFilter) {
    let (footprint_x, footprint_y) = to_source.scaling_abs();
    let footprint = footprint_x.max(footprint_y);
    for (dst_x, dst_y, pixel) in dst.enumerate_pixels_mut() {
        let (sx, sy) = to_source.apply(dst_x as f64 + 0.5, dst_y as f64 + 0.5);
        pixel.0 = sample::sample(src, sx - 0.5, sy - 0.5, filter, footprint);
    }
}



// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use image::Rgba;
    use proptest::prelude::*;

    fn noise_image(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            let v = x.wrapping_mul(73).wrapping_add(y.wrapping_mul(151));
            let (r, g, b) = (v % 256, (v / 3) % 256, (v / 7) % 256);
            Rgba([r as u8, g as u8, b as u8, 255])
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// Property: an untransformed integer crop copies the source sub-rectangle.
        #[test]
        fn prop_identity_crop_copies_pixels(
            (width, height) in (16u32..=40, 16u32..=40),
            x in 0u32..8,
            y in 0u32..8,
            size in 1u32..=8,
        ) {
            let img = noise_image(width, height);
            let source = SourceImage::at_natural_size(img.clone());
            let mut surface = Surface::new();
            let crop = CropRect::new(x as f64, y as f64, size as f64, size as f64);

            let options = RenderOptions::default();
            render(&source, &mut surface, &crop, &Transform::default(), &options).unwrap();

            let expected = image::imageops::crop_imm(&img, x, y, size, size).to_image();
            prop_assert_eq!(surface.image(), &expected);
        }

        /// Property: rendering twice gives identical surfaces.
        #[test]
        fn prop_render_idempotent(
            scale in 0.25f64..4.0,
            rotate in -720.0f64..720.0,
            x in 0.0f64..10.0,
            y in 0.0f64..10.0,
            size in 1.0f64..20.0,
        ) {
            let source = SourceImage::new(noise_image(60, 40), Size::new(30.0, 20.0));
            let crop = CropRect::new(x, y, size, size);
            let transform = Transform::new(scale, rotate);
            let options = RenderOptions::default();

            let mut a = Surface::new();
            let mut b = Surface::new();
            let first = render(&source, &mut a, &crop, &transform, &options).unwrap();
            let second = render(&source, &mut b, &crop, &transform, &options).unwrap();

            prop_assert_eq!(first, second);
            prop_assert_eq!(a.image(), b.image());
        }

        /// Property: adding full turns to the rotation does not change the output.
        #[test]
        fn prop_full_turns_ignored(
            rotate in -180.0f64..180.0,
            turns in -3i32..=3,
        ) {
            let source = SourceImage::at_natural_size(noise_image(32, 32));
            let crop = CropRect::new(4.0, 4.0, 16.0, 16.0);
            let options = RenderOptions::default();

            let mut a = Surface::new();
            let mut b = Surface::new();
            render(&source, &mut a, &crop, &Transform::new(1.0, rotate), &options).unwrap();
            let turned = Transform::new(1.0, rotate + 360.0 * turns as f64);
            render(&source, &mut b, &crop, &turned, &options).unwrap();

            // rem_euclid may differ in the last bit, so allow resampling tolerance
            for (pa, pb) in a.image().pixels().zip(b.image().pixels()) {
                for i in 0..4 {
                    prop_assert!((pa.0[i] as i32 - pb.0[i] as i32).abs() <= 1);
                }
            }
        }

        /// Property: surface size follows the crop, ratio and pixel ratio.
        #[test]
        fn prop_surface_dimensions(
            size in 1u32..=50,
            dpr in prop::sample::select(vec![1.0f64, 1.5, 2.0, 3.0]),
        ) {
            let source = SourceImage::new(noise_image(200, 200), Size::new(100.0, 100.0));
            let crop = CropRect::new(0.0, 0.0, size as f64, size as f64);
            let options = RenderOptions {
                device_pixel_ratio: dpr,
                ..Default::default()
            };

            let plan = plan_render(&source, &crop, &Transform::default(), &options)
                .unwrap()
                .unwrap();
            let expected = (size as f64 * 2.0 * dpr).floor() as u32;
            prop_assert_eq!(plan.width, expected);
            prop_assert_eq!(plan.height, expected);
            prop_assert_eq!(plan.logical, Size::new(size as f64, size as f64));
        }
    }
}
