//! Crop-region tracker: in-progress and completed rectangles plus the
//! scale/rotate transform parameters.
//!
//! The tracker is pure state. Observers registered with
//! [`CropTracker::subscribe`] are called synchronously whenever the
//! render-relevant tuple `{completed, scale, rotate}` changes.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::geometry::CropRect;

/// Errors returned when setting transform parameters.
#[derive(Debug, Error, PartialEq)]
pub enum TrackerError {
    /// Scale must be a positive, finite number.
    #[error("Invalid scale {0}: must be positive and finite")]
    InvalidScale(f64),

    /// Rotation must be finite.
    #[error("Invalid rotation {0}: must be finite")]
    InvalidRotation(f64),
}

/// Uniform scale and clockwise rotation applied to the displayed image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    /// Uniform magnification (default 1.0).
    pub scale: f64,
    /// Clockwise rotation in degrees about the image center (default 0).
    pub rotate: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            rotate: 0.0,
        }
    }
}

impl Transform {
    pub fn new(scale: f64, rotate: f64) -> Self {
        Self { scale, rotate }
    }

    /// Rotation folded into `[0, 360)`.
    pub fn normalized_rotation(&self) -> f64 {
        self.rotate.rem_euclid(360.0)
    }
}

/// Snapshot passed to observers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderState {
    pub completed: Option<CropRect>,
    pub transform: Transform,
}

type Listener = Box<dyn FnMut(&RenderState)>;

/// Holds the user-adjustable crop and its committed snapshot.
#[derive(Default)]
pub struct CropTracker {
    crop: Option<CropRect>,
    completed: Option<CropRect>,
    transform: Transform,
    listeners: Vec<Listener>,
}

impl std::fmt::Debug for CropTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CropTracker")
            .field("crop", &self.crop)
            .field("completed", &self.completed)
            .field("transform", &self.transform)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl CropTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the in-progress crop to the centered square of a freshly loaded
    /// image and return it.
    pub fn initialize_centered(&mut self, width: f64, height: f64) -> CropRect {
        let rect = CropRect::centered_square(width, height);
        debug!(
            x = rect.x,
            y = rect.y,
            size = rect.width,
            "squarecrop.tracker.initialize"
        );
        self.crop = Some(rect);
        rect
    }

    /// Replace the in-progress crop while a drag is underway.
    pub fn update_during_drag(&mut self, rect: CropRect) {
        self.crop = Some(rect);
    }

    /// Freeze `rect` as the completed crop. Returns true if observers were notified.
    pub fn commit(&mut self, rect: CropRect) -> bool {
        self.crop = Some(rect);
        if self.completed == Some(rect) {
            return false;
        }
        self.completed = Some(rect);
        debug!(
            x = rect.x,
            y = rect.y,
            width = rect.width,
            height = rect.height,
            "squarecrop.tracker.commit"
        );
        self.notify();
        true
    }

    /// Commit whatever the in-progress crop currently is.
    pub fn commit_current(&mut self) -> bool {
        match self.crop {
            Some(rect) => self.commit(rect),
            None => false,
        }
    }

    pub fn set_scale(&mut self, scale: f64) -> Result<bool, TrackerError> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(TrackerError::InvalidScale(scale));
        }
        if self.transform.scale == scale {
            return Ok(false);
        }
        self.transform.scale = scale;
        self.notify();
        Ok(true)
    }

    pub fn set_rotate(&mut self, degrees: f64) -> Result<bool, TrackerError> {
        if !degrees.is_finite() {
            return Err(TrackerError::InvalidRotation(degrees));
        }
        if self.transform.rotate == degrees {
            return Ok(false);
        }
        self.transform.rotate = degrees;
        self.notify();
        Ok(true)
    }

    /// Forget the crop for a new image. Observers are notified if the
    /// render-relevant state changed.
    pub fn reset(&mut self) {
        let before = self.render_state();
        self.crop = None;
        self.completed = None;
        self.transform = Transform::default();
        if self.render_state() != before {
            self.notify();
        }
    }

    /// Register an observer of `{completed, scale, rotate}` changes.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&RenderState) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    pub fn crop(&self) -> Option<CropRect> {
        self.crop
    }

    pub fn completed(&self) -> Option<CropRect> {
        self.completed
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn render_state(&self) -> RenderState {
        RenderState {
            completed: self.completed,
            transform: self.transform,
        }
    }

    fn notify(&mut self) {
        let state = self.render_state();
        for listener in &mut self.listeners {
            listener(&state);
        }
    }
}
