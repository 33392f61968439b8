//! Render destination: an RGBA pixel buffer with a logical size.

use image::RgbaImage;

use crate::geometry::Size;

/// Output surface for the render core.
///
/// The logical size is the completed crop in display units; the pixel size
/// is the logical size multiplied by the output density. Resizing clears
/// the buffer to transparent, like assigning a canvas's width.
#[derive(Debug, Clone)]
pub struct Surface {
    logical: Size,
    pixels: RgbaImage,
}

impl Default for Surface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface {
    /// An empty 0x0 surface.
    pub fn new() -> Self {
        Self {
            logical: Size::default(),
            pixels: RgbaImage::new(0, 0),
        }
    }

    /// Reallocate to `width` x `height` pixels, all transparent.
    pub fn resize(&mut self, width: u32, height: u32, logical: Size) {
        self.pixels = RgbaImage::new(width, height);
        self.logical = logical;
    }

    /// Pixel width.
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Pixel height.
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn logical_size(&self) -> Size {
        self.logical
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn image(&self) -> &RgbaImage {
        &self.pixels
    }

    pub(crate) fn image_mut(&mut self) -> &mut RgbaImage {
        &mut self.pixels
    }

    /// Raw RGBA bytes, row-major, 4 bytes per pixel.
    pub fn as_bytes(&self) -> &[u8] {
        self.pixels.as_raw()
    }
}
