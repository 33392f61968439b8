//! Handing encoded crops to whatever saves them.
//!
//! Saving differs per environment: a desktop browser can download through a
//! hidden anchor, some mobile browsers ignore the `download` attribute and
//! need the image opened in a new tab instead, and native callers write a
//! file. Each of these is a [`SaveStrategy`]; the session only ever talks
//! to the trait.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors raised by save strategies.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Writing to disk failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The host environment refused the save (blocked popup, missing DOM, ...).
    #[error("Save failed: {0}")]
    SaveFailed(String),
}

/// An encoded crop ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime_type: String,
}

/// Destination for exported crops.
pub trait SaveStrategy {
    fn save(&mut self, export: &Export) -> Result<(), ExportError>;
}

/// Writes exports into a directory, overwriting files with the same name.
#[derive(Debug, Clone)]
pub struct DirectorySave {
    dir: PathBuf,
}

impl DirectorySave {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SaveStrategy for DirectorySave {
    fn save(&mut self, export: &Export) -> Result<(), ExportError> {
        let path = self.dir.join(&export.file_name);
        fs::write(&path, &export.bytes)?;
        debug!(path = %path.display(), bytes = export.bytes.len(), "squarecrop.export.file");
        Ok(())
    }
}

/// Keeps every export in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySave {
    pub exports: Vec<Export>,
}

impl MemorySave {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&Export> {
        self.exports.last()
    }
}

impl SaveStrategy for MemorySave {
    fn save(&mut self, export: &Export) -> Result<(), ExportError> {
        self.exports.push(export.clone());
        Ok(())
    }
}

/// How the host environment can deliver a file to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentCapabilities {
    /// Anchors with a `download` attribute save the file directly.
    pub supports_download_attribute: bool,
    /// The device is a phone or tablet.
    pub is_mobile: bool,
}

/// Browser save behaviors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// Click a hidden anchor pointing at a blob URL.
    DirectDownload,
    /// Open the blob URL so the user can long-press and save it.
    OpenInNewTab,
}

impl EnvironmentCapabilities {
    /// Pick the save behavior for this environment.
    pub fn save_mode(&self) -> SaveMode {
        if self.supports_download_attribute && !self.is_mobile {
            SaveMode::DirectDownload
        } else {
            SaveMode::OpenInNewTab
        }
    }
}
