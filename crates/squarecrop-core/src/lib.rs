//! squarecrop core - square image cropping library
//!
//! This crate provides the domain logic for squarecrop: the crop-region
//! tracker, the render pipeline that turns a display-space crop into a
//! native-resolution pixel surface, and decode/encode/export around it.
//!
//! # Module Structure
//!
//! - `geometry` - Crop rectangles, sizes and display fitting
//! - `affine` - Canvas-style 2D transform matrix
//! - `tracker` - In-progress/completed crop state and scale/rotate parameters
//! - `render` - The render core and its output surface
//! - `decode` - File bytes to oriented RGBA bitmaps
//! - `encode` - Surface to PNG/JPEG bytes
//! - `export` - Save strategies
//! - `session` - The crop page tying everything together

pub mod affine;
pub mod config;
pub mod decode;
pub mod encode;
pub mod export;
pub mod geometry;
pub mod render;
pub mod session;
pub mod tracker;

pub use config::CropConfig;
pub use export::{EnvironmentCapabilities, Export, SaveMode, SaveStrategy};
pub use geometry::{CropRect, Size};
pub use render::{render, RenderOptions, RenderOutcome, SourceImage, Surface};
pub use session::{CropSession, SessionError};
pub use tracker::{CropTracker, Transform};
