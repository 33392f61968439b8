//! WASM bindings for the crop session.
//!
//! Mirrors the page flow: load a file, let the gesture widget report crop
//! changes, adjust scale/rotate, then download.
//!
//! # Example (TypeScript)
//!
//! ```typescript
//! const session = JsCropSession.with_config({ device_pixel_ratio: window.devicePixelRatio });
//! const initial = session.load_image(bytes, img.width, img.height);
//!
//! // react to the gesture widget
//! session.update_crop(c.x, c.y, c.width, c.height);   // onChange
//! session.complete_crop(c.x, c.y, c.width, c.height); // onComplete
//!
//! // paint the preview canvas
//! const data = new ImageData(new Uint8ClampedArray(session.surface_pixels()),
//!                            session.surface_width, session.surface_height);
//!
//! session.download({ supports_download_attribute: true, is_mobile: false });
//! ```

use squarecrop_core::{
    CropConfig, CropRect, CropSession, EnvironmentCapabilities, RenderOutcome, Size,
};
use tracing::debug;
use wasm_bindgen::prelude::*;

use crate::save::select_save_strategy;
use crate::types::JsCropRect;

#[wasm_bindgen]
pub struct JsCropSession {
    inner: CropSession,
}

#[wasm_bindgen]
impl JsCropSession {
    /// Create a session with default configuration.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            inner: CropSession::new(CropConfig::default()),
        }
    }

    /// Create a session from a (possibly partial) configuration object.
    pub fn with_config(config: JsValue) -> Result<JsCropSession, JsValue> {
        let config: CropConfig =
            serde_wasm_bindgen::from_value(config).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self {
            inner: CropSession::new(config),
        })
    }

    /// Decode the selected file and return the initial centered crop.
    ///
    /// Pass the image element's rendered width/height when known; otherwise
    /// the image is fitted into the configured preview box.
    pub fn load_image(
        &mut self,
        bytes: &[u8],
        display_width: Option<f64>,
        display_height: Option<f64>,
    ) -> Result<JsCropRect, JsValue> {
        let display = match (display_width, display_height) {
            (Some(w), Some(h)) => Some(Size::new(w, h)),
            _ => None,
        };
        self.inner
            .load_image(bytes, display)
            .map(JsCropRect::from)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// The image element was laid out at a new size.
    pub fn set_display_size(&mut self, width: f64, height: f64) -> Result<bool, JsValue> {
        let outcome = self
            .inner
            .set_display_size(Size::new(width, height))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(rendered(outcome))
    }

    pub fn update_crop(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.inner.update_crop(CropRect::new(x, y, width, height));
    }

    /// Returns true if the surface was redrawn.
    pub fn complete_crop(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<bool, JsValue> {
        let outcome = self
            .inner
            .complete_crop(CropRect::new(x, y, width, height))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(rendered(outcome))
    }

    pub fn commit_current(&mut self) -> Result<bool, JsValue> {
        let outcome = self
            .inner
            .commit_current()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(rendered(outcome))
    }

    pub fn set_scale(&mut self, scale: f64) -> Result<bool, JsValue> {
        let outcome = self
            .inner
            .set_scale(scale)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(rendered(outcome))
    }

    pub fn set_rotate(&mut self, degrees: f64) -> Result<bool, JsValue> {
        let outcome = self
            .inner
            .set_rotate(degrees)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(rendered(outcome))
    }

    pub fn crop(&self) -> Option<JsCropRect> {
        self.inner.crop().map(JsCropRect::from)
    }

    pub fn completed_crop(&self) -> Option<JsCropRect> {
        self.inner.completed_crop().map(JsCropRect::from)
    }

    #[wasm_bindgen(getter)]
    pub fn scale(&self) -> f64 {
        self.inner.transform().scale
    }

    #[wasm_bindgen(getter)]
    pub fn rotate(&self) -> f64 {
        self.inner.transform().rotate
    }

    /// Surface width in pixels (0 before the first render).
    #[wasm_bindgen(getter)]
    pub fn surface_width(&self) -> u32 {
        self.inner.surface().map_or(0, |s| s.width())
    }

    /// Surface height in pixels (0 before the first render).
    #[wasm_bindgen(getter)]
    pub fn surface_height(&self) -> u32 {
        self.inner.surface().map_or(0, |s| s.height())
    }

    /// RGBA surface pixels, ready for `new ImageData(...)`.
    ///
    /// Note: This copies the pixel data out of WASM memory.
    pub fn surface_pixels(&self) -> Vec<u8> {
        self.inner
            .surface()
            .map(|s| s.as_bytes().to_vec())
            .unwrap_or_default()
    }

    /// True between `begin_export` and `finish_export`; drives the spinner.
    #[wasm_bindgen(getter)]
    pub fn is_exporting(&self) -> bool {
        self.inner.is_exporting()
    }

    /// Encode the surface and mark the session busy.
    ///
    /// For hosts that save asynchronously (share sheet, File System Access):
    /// call `finish_export` when the save settles.
    pub fn begin_export(&mut self) -> Result<Vec<u8>, JsValue> {
        self.inner
            .begin_export()
            .map(|export| export.bytes)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn finish_export(&mut self) {
        self.inner.finish_export();
    }

    /// Encode the surface in the configured format.
    pub fn export_bytes(&self) -> Result<Vec<u8>, JsValue> {
        self.inner
            .export()
            .map(|export| export.bytes)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Encode and save the surface with the strategy that fits `capabilities`.
    pub fn download(&mut self, capabilities: JsValue) -> Result<(), JsValue> {
        let capabilities: EnvironmentCapabilities = serde_wasm_bindgen::from_value(capabilities)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        debug!(mode = ?capabilities.save_mode(), "squarecrop.wasm.download");

        let mut strategy = select_save_strategy(capabilities);
        self.inner
            .download(strategy.as_mut())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl Default for JsCropSession {
    fn default() -> Self {
        Self::new()
    }
}

fn rendered(outcome: Option<RenderOutcome>) -> bool {
    matches!(outcome, Some(RenderOutcome::Rendered { .. }))
}
