//! Browser save strategies.
//!
//! - [`AnchorDownload`] - blob URL + hidden `<a download>` click
//! - [`OpenInNewTab`] - blob URL opened in a new tab, for browsers that
//!   ignore the `download` attribute (mostly mobile)

use js_sys::{Array, Uint8Array};
use squarecrop_core::export::{
    EnvironmentCapabilities, Export, ExportError, SaveMode, SaveStrategy,
};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

/// How long a blob URL stays alive after it was handed to the browser.
/// Downloads and new tabs read it asynchronously.
const REVOKE_DELAY_MS: i32 = 60_000;

/// Click a hidden anchor pointing at the export.
#[derive(Debug, Default)]
pub struct AnchorDownload;

/// Open the export in a new browsing context.
#[derive(Debug, Default)]
pub struct OpenInNewTab;

impl SaveStrategy for AnchorDownload {
    fn save(&mut self, export: &Export) -> Result<(), ExportError> {
        let url = blob_url(export)?;
        match click_anchor(&url, &export.file_name) {
            Ok(()) => {
                revoke_later(url);
                Ok(())
            }
            Err(e) => {
                let _ = Url::revoke_object_url(&url);
                Err(e)
            }
        }
    }
}

impl SaveStrategy for OpenInNewTab {
    fn save(&mut self, export: &Export) -> Result<(), ExportError> {
        let url = blob_url(export)?;
        let opened = web_sys::window()
            .ok_or_else(|| failed("no window"))
            .and_then(|w| w.open_with_url_and_target(&url, "_blank").map_err(js_failed));
        match opened {
            Ok(Some(_)) => {
                revoke_later(url);
                Ok(())
            }
            Ok(None) => {
                let _ = Url::revoke_object_url(&url);
                Err(failed("new tab was blocked"))
            }
            Err(e) => {
                let _ = Url::revoke_object_url(&url);
                Err(e)
            }
        }
    }
}

/// Pick the save strategy that works in an environment.
pub fn select_save_strategy(capabilities: EnvironmentCapabilities) -> Box<dyn SaveStrategy> {
    match capabilities.save_mode() {
        SaveMode::DirectDownload => Box::new(AnchorDownload),
        SaveMode::OpenInNewTab => Box::new(OpenInNewTab),
    }
}

fn blob_url(export: &Export) -> Result<String, ExportError> {
    let parts = Array::new();
    parts.push(&Uint8Array::from(export.bytes.as_slice()).into());

    let options = BlobPropertyBag::new();
    options.set_type(&export.mime_type);

    let blob =
        Blob::new_with_u8_array_sequence_and_options(&parts, &options).map_err(js_failed)?;
    Url::create_object_url_with_blob(&blob).map_err(js_failed)
}

/// Click a temporary `<a download>` attached to the body.
///
/// Firefox ignores clicks on detached anchors, so it is appended first and
/// removed right after.
fn click_anchor(url: &str, file_name: &str) -> Result<(), ExportError> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| failed("no document"))?;
    let body = document.body().ok_or_else(|| failed("no document body"))?;
    let anchor = document
        .create_element("a")
        .map_err(js_failed)?
        .dyn_into::<HtmlAnchorElement>()
        .map_err(|_| failed("created element is not an anchor"))?;

    anchor.set_href(url);
    anchor.set_download(file_name);
    anchor.style().set_property("display", "none").map_err(js_failed)?;
    body.append_child(&anchor).map_err(js_failed)?;
    anchor.click();
    anchor.remove();
    Ok(())
}

/// Revoke `url` after [`REVOKE_DELAY_MS`]. If no timer can be scheduled the
/// URL lives until the page unloads.
fn revoke_later(url: String) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let revoke = Closure::once_into_js(move || {
        let _ = Url::revoke_object_url(&url);
    });
    let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
        revoke.unchecked_ref(),
        REVOKE_DELAY_MS,
    );
}

fn failed(message: &str) -> ExportError {
    ExportError::SaveFailed(message.to_string())
}

fn js_failed(value: JsValue) -> ExportError {
    ExportError::SaveFailed(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
}
