//! squarecrop WASM - WebAssembly bindings for squarecrop
//!
//! This crate exposes the squarecrop-core crop session to JavaScript so a
//! browser page only has to wire up the file input, the crop gesture widget
//! and a preview canvas.
//!
//! # Module Structure
//!
//! - `session` - `JsCropSession`, the crop page state machine
//! - `save` - Browser download strategies (anchor click, new tab)
//! - `types` - WASM-compatible wrapper types
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsCropSession } from '@squarecrop/wasm';
//!
//! await init();
//!
//! const session = new JsCropSession();
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const crop = session.load_image(bytes, img.width, img.height);
//! ```

use wasm_bindgen::prelude::*;

mod save;
mod session;
mod types;

pub use save::{select_save_strategy, AnchorDownload, OpenInNewTab};
pub use session::JsCropSession;
pub use types::JsCropRect;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::debug_1(&JsValue::from_str(&format!("squarecrop-wasm {}", version())));
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// The default crop for an image displayed at `width` x `height`.
#[wasm_bindgen]
pub fn centered_crop(width: f64, height: f64) -> JsCropRect {
    squarecrop_core::CropRect::centered_square(width, height).into()
}
