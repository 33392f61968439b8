//! Crop rectangles and image sizes in display and natural coordinates.
//!
//! # Coordinate System
//!
//! - All rectangles are in display pixels (the on-screen size of the image)
//! - Origin is the top-left corner of the displayed image
//! - x grows to the right, y grows downward

use serde::{Deserialize, Serialize};

/// A crop rectangle in display-pixel units.
///
/// Produced by the gesture widget. The widget guarantees non-negative
/// values that stay inside the displayed image; nothing here re-checks that.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    /// Left edge in display pixels.
    pub x: f64,
    /// Top edge in display pixels.
    pub y: f64,
    /// Width in display pixels.
    pub width: f64,
    /// Height in display pixels.
    pub height: f64,
}

impl CropRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The largest square centered inside a `width` x `height` image.
    ///
    /// This is the default crop shown before any user interaction.
    pub fn centered_square(width: f64, height: f64) -> Self {
        let size = width.min(height).max(0.0);
        Self {
            x: (width - size) / 2.0,
            y: (height - size) / 2.0,
            width: size,
            height: size,
        }
    }

    /// True when the rectangle has no area to render.
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// True when the rectangle lies fully inside `[0, width] x [0, height]`,
    /// allowing for floating point error on the far edges.
    pub fn is_within(&self, width: f64, height: f64) -> bool {
        const EPS: f64 = 1e-9;
        self.x >= 0.0
            && self.y >= 0.0
            && self.width >= 0.0
            && self.height >= 0.0
            && self.x + self.width <= width + EPS
            && self.y + self.height <= height + EPS
    }
}

/// A width/height pair in (possibly fractional) pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when both sides are positive and finite.
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Compute the displayed size of an image laid out with `object-fit: contain`
/// inside a `max_width` x `max_height` box.
///
/// Images smaller than the box are shown at natural size; larger ones are
/// shrunk to fit while keeping their aspect ratio.
pub fn fit_display_size(
    natural_width: u32,
    natural_height: u32,
    max_width: f64,
    max_height: f64,
) -> Size {
    let w = natural_width as f64;
    let h = natural_height as f64;
    if w <= 0.0 || h <= 0.0 {
        return Size::default();
    }

    let scale = (max_width / w).min(max_height / h).min(1.0);
    if !scale.is_finite() || scale <= 0.0 {
        return Size::new(w, h);
    }
    Size::new(w * scale, h * scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_square_landscape() {
        let rect = CropRect::centered_square(400.0, 300.0);
        assert_eq!(rect, CropRect::new(50.0, 0.0, 300.0, 300.0));
    }

    #[test]
    fn test_centered_square_portrait() {
        let rect = CropRect::centered_square(300.0, 500.0);
        assert_eq!(rect, CropRect::new(0.0, 100.0, 300.0, 300.0));
    }

    #[test]
    fn test_centered_square_already_square() {
        let rect = CropRect::centered_square(256.0, 256.0);
        assert_eq!(rect, CropRect::new(0.0, 0.0, 256.0, 256.0));
    }

    #[test]
    fn test_centered_square_odd_difference() {
        // (101 - 100) / 2 = 0.5, fractional offsets are kept
        let rect = CropRect::centered_square(101.0, 100.0);
        assert_eq!(rect.x, 0.5);
        assert_eq!(rect.y, 0.0);
        assert!(rect.is_within(101.0, 100.0));
    }

    #[test]
    fn test_degenerate() {
        assert!(CropRect::new(10.0, 10.0, 0.0, 20.0).is_degenerate());
        assert!(CropRect::new(10.0, 10.0, 20.0, 0.0).is_degenerate());
        assert!(CropRect::new(0.0, 0.0, f64::NAN, 1.0).is_degenerate());
        assert!(!CropRect::new(0.0, 0.0, 1.0, 1.0).is_degenerate());
    }

    #[test]
    fn test_is_within() {
        assert!(CropRect::new(0.0, 0.0, 100.0, 100.0).is_within(100.0, 100.0));
        assert!(!CropRect::new(1.0, 0.0, 100.0, 100.0).is_within(100.0, 100.0));
        assert!(!CropRect::new(-1.0, 0.0, 10.0, 10.0).is_within(100.0, 100.0));
    }

    #[test]
    fn test_fit_display_size_shrinks_large_images() {
        let size = fit_display_size(1344, 1008, 672.0, 672.0);
        assert_eq!(size, Size::new(672.0, 504.0));
    }

    #[test]
    fn test_fit_display_size_keeps_small_images() {
        let size = fit_display_size(320, 200, 672.0, 672.0);
        assert_eq!(size, Size::new(320.0, 200.0));
    }

    #[test]
    fn test_fit_display_size_empty_image() {
        assert!(!fit_display_size(0, 10, 672.0, 672.0).is_valid());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
