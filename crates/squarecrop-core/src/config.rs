//! Session configuration.
//!
//! Everything here has a default, and JavaScript callers may pass a partial
//! object: missing fields fall back to [`CropConfig::default`].

use serde::{Deserialize, Serialize};

use crate::encode::ExportFormat;
use crate::render::{InterpolationFilter, OutputResolution, RenderOptions};

/// Width and height of the preview box the image is fitted into.
pub const DEFAULT_MAX_DISPLAY: f64 = 672.0;

/// Base name for downloaded files; the extension follows the format.
pub const DEFAULT_FILE_NAME: &str = "cropped-image";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropConfig {
    /// Physical pixels per CSS pixel (`window.devicePixelRatio`).
    pub device_pixel_ratio: f64,
    pub filter: InterpolationFilter,
    pub resolution: OutputResolution,
    pub format: ExportFormat,
    pub file_name: String,
    /// Preview box used when the host does not report a displayed size.
    pub max_display_width: f64,
    pub max_display_height: f64,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            device_pixel_ratio: 1.0,
            filter: InterpolationFilter::default(),
            resolution: OutputResolution::default(),
            format: ExportFormat::default(),
            file_name: DEFAULT_FILE_NAME.to_string(),
            max_display_width: DEFAULT_MAX_DISPLAY,
            max_display_height: DEFAULT_MAX_DISPLAY,
        }
    }
}

impl CropConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            device_pixel_ratio: self.device_pixel_ratio,
            filter: self.filter,
            resolution: self.resolution,
        }
    }

    /// File name with the extension of the configured format.
    pub fn export_file_name(&self) -> String {
        format!("{}.{}", self.file_name, self.format.extension())
    }
}
