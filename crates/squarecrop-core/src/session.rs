//! The crop page as a single component.
//!
//! A `CropSession` owns the loaded source, the crop tracker and the output
//! surface. Every change to the completed crop, scale or rotation re-renders
//! the surface before returning, so an export right after a change always
//! sees up-to-date pixels. Saving goes through an injected [`SaveStrategy`].

use thiserror::Error;
use tracing::{debug, info};

use crate::config::CropConfig;
use crate::decode::{decode_image, DecodeError};
use crate::encode::{encode_surface, EncodeError};
use crate::export::{Export, ExportError, SaveStrategy};
use crate::geometry::{fit_display_size, CropRect, Size};
use crate::render::{render, RenderError, RenderOutcome, SourceImage, Surface};
use crate::tracker::{CropTracker, Transform, TrackerError};

/// Errors surfaced by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Tracker(#[from] TrackerError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Export(#[from] ExportError),

    /// Download was requested before anything was rendered.
    #[error("Crop surface does not exist")]
    NoSurface,

    /// A display size was set before any image was loaded.
    #[error("No image loaded")]
    NoSource,

    /// An export was started while the previous one is still being saved.
    #[error("Export already in progress")]
    ExportInProgress,
}

#[derive(Debug, Default)]
pub struct CropSession {
    config: CropConfig,
    tracker: CropTracker,
    source: Option<SourceImage>,
    surface: Option<Surface>,
    exporting: bool,
}

impl CropSession {
    pub fn new(config: CropConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Decode a selected file and load it.
    ///
    /// `display` is the on-screen size of the image element; when the host
    /// has none yet, the image is fitted into the configured preview box.
    pub fn load_image(
        &mut self,
        bytes: &[u8],
        display: Option<Size>,
    ) -> Result<CropRect, SessionError> {
        let pixels = decode_image(bytes)?;
        let display = display.unwrap_or_else(|| {
            fit_display_size(
                pixels.width(),
                pixels.height(),
                self.config.max_display_width,
                self.config.max_display_height,
            )
        });
        Ok(self.load_source(SourceImage::new(pixels, display)))
    }

    /// Replace the source, forget the previous crop and start from the
    /// centered square of the new image.
    pub fn load_source(&mut self, source: SourceImage) -> CropRect {
        self.tracker.reset();
        self.surface = None;

        let shown = source.display_size();
        info!(
            natural_width = source.natural_width(),
            natural_height = source.natural_height(),
            display_width = shown.width,
            display_height = shown.height,
            "squarecrop.session.load"
        );
        self.source = Some(source);
        self.tracker.initialize_centered(shown.width, shown.height)
    }

    /// Record a responsive relayout of the image element.
    pub fn set_display_size(
        &mut self,
        display: Size,
    ) -> Result<Option<RenderOutcome>, SessionError> {
        let source = self.source.as_mut().ok_or(SessionError::NoSource)?;
        source.set_display_size(display);
        self.rerender()
    }

    /// In-progress drag update. Does not render.
    pub fn update_crop(&mut self, rect: CropRect) {
        self.tracker.update_during_drag(rect);
    }

    /// The drag ended on `rect`.
    pub fn complete_crop(&mut self, rect: CropRect) -> Result<Option<RenderOutcome>, SessionError> {
        if self.tracker.commit(rect) {
            return self.rerender();
        }
        Ok(None)
    }

    /// Commit the in-progress crop (for example the initial centered square).
    pub fn commit_current(&mut self) -> Result<Option<RenderOutcome>, SessionError> {
        if self.tracker.commit_current() {
            return self.rerender();
        }
        Ok(None)
    }

    pub fn set_scale(&mut self, scale: f64) -> Result<Option<RenderOutcome>, SessionError> {
        if self.tracker.set_scale(scale)? {
            return self.rerender();
        }
        Ok(None)
    }

    pub fn set_rotate(&mut self, degrees: f64) -> Result<Option<RenderOutcome>, SessionError> {
        if self.tracker.set_rotate(degrees)? {
            return self.rerender();
        }
        Ok(None)
    }

    /// Render the completed crop if there is one with area and an image to
    /// draw from. Returns `None` when those preconditions are not met.
    pub fn rerender(&mut self) -> Result<Option<RenderOutcome>, SessionError> {
        let source = self.source.as_ref();
        let (Some(source), Some(completed)) = (source, self.tracker.completed()) else {
            return Ok(None);
        };
        if completed.is_degenerate() {
            return Ok(None);
        }

        let surface = self.surface.get_or_insert_with(Surface::new);
        let outcome = render(
            source,
            surface,
            &completed,
            &self.tracker.transform(),
            &self.config.render_options(),
        )?;
        Ok(Some(outcome))
    }

    /// Encode the current surface with the configured format.
    pub fn export(&self) -> Result<Export, SessionError> {
        let surface = self
            .surface
            .as_ref()
            .filter(|s| !s.is_empty())
            .ok_or(SessionError::NoSurface)?;

        let bytes = encode_surface(surface, self.config.format)?;
        debug!(
            width = surface.width(),
            height = surface.height(),
            bytes = bytes.len(),
            "squarecrop.session.export"
        );
        Ok(Export {
            bytes,
            file_name: self.config.export_file_name(),
            mime_type: self.config.format.mime_type().to_string(),
        })
    }

    /// Encode the surface and mark the session busy.
    ///
    /// Hosts that save asynchronously call this, hand the bytes off, and call
    /// [`finish_export`](Self::finish_export) once the save settles. A second
    /// export is refused until then.
    pub fn begin_export(&mut self) -> Result<Export, SessionError> {
        if self.exporting {
            return Err(SessionError::ExportInProgress);
        }
        let export = self.export()?;
        self.exporting = true;
        Ok(export)
    }

    /// Clear the busy flag set by [`begin_export`](Self::begin_export).
    pub fn finish_export(&mut self) {
        self.exporting = false;
    }

    /// Export and hand the file to `strategy`.
    pub fn download(&mut self, strategy: &mut dyn SaveStrategy) -> Result<(), SessionError> {
        let export = self.begin_export()?;
        let result = strategy.save(&export).map_err(SessionError::from);
        self.finish_export();
        result
    }

    /// True between `begin_export` and `finish_export`.
    pub fn is_exporting(&self) -> bool {
        self.exporting
    }

    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref().filter(|s| !s.is_empty())
    }

    pub fn source(&self) -> Option<&SourceImage> {
        self.source.as_ref()
    }

    pub fn crop(&self) -> Option<CropRect> {
        self.tracker.crop()
    }

    pub fn completed_crop(&self) -> Option<CropRect> {
        self.tracker.completed()
    }

    pub fn transform(&self) -> Transform {
        self.tracker.transform()
    }

    pub fn config(&self) -> &CropConfig {
        &self.config
    }

    /// Access to the tracker, for registering observers.
    pub fn tracker_mut(&mut self) -> &mut CropTracker {
        &mut self.tracker
    }
}
