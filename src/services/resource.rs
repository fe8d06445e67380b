//! Bundled resource service (`LOAD_HTML`).
//!
//! Resources are addressed by logical path relative to a fixed root
//! (`web/public` by default). A leading `/` is ignored, so `about.html`
//! and `/about.html` name the same resource.

// ============================================================================
// Imports
// ============================================================================

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};
use crate::protocol::HtmlDocument;

// ============================================================================
// Constants
// ============================================================================

/// Default resource root, relative to the working directory.
pub const DEFAULT_RESOURCE_ROOT: &str = "web/public";

// ============================================================================
// ResourceService
// ============================================================================

/// Resolves bundled resources by logical path.
pub trait ResourceService: Send + Sync {
    /// Reads a resource.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if the resource is not in the bundle
    /// - [`Error::Io`] if it exists but cannot be read
    fn load_resource(&self, logical_path: &str) -> Result<Vec<u8>>;

    /// Returns the URL a surface navigates to for this resource.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if the resource is not in the bundle.
    fn resource_url(&self, logical_path: &str) -> Result<Url>;

    /// Loads the HTML resource named by a string payload.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidPayload`] if the payload is not a non-empty string
    /// - [`Error::NotFound`] if the resource is not in the bundle
    /// - [`Error::Io`] if it cannot be read or is not UTF-8
    fn load_html(&self, payload: &Value) -> Result<HtmlDocument> {
        let path = match payload {
            Value::String(path) if !path.is_empty() => path.as_str(),
            Value::String(_) | Value::Null => {
                return Err(Error::invalid_payload("HTML path is required"));
            }
            _ => return Err(Error::invalid_payload("payload must be a string")),
        };

        let bytes = self.load_resource(path)?;
        let content = String::from_utf8(bytes).map_err(|e| {
            Error::io(path, std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })?;

        debug!(path, bytes = content.len(), "HTML resource loaded");

        Ok(HtmlDocument {
            content,
            path: path.to_string(),
        })
    }
}

// ============================================================================
// BundledResources
// ============================================================================

/// [`ResourceService`] serving files under a root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundledResources {
    /// Directory logical paths are resolved against.
    root: PathBuf,
}

impl BundledResources {
    /// Creates a service rooted at `root`.
    #[inline]
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the resource root.
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a logical path onto the filesystem.
    fn resolve(&self, logical_path: &str) -> PathBuf {
        self.root.join(logical_path.trim_start_matches('/'))
    }
}

impl Default for BundledResources {
    fn default() -> Self {
        Self::new(DEFAULT_RESOURCE_ROOT)
    }
}

impl ResourceService for BundledResources {
    fn load_resource(&self, logical_path: &str) -> Result<Vec<u8>> {
        let path = self.resolve(logical_path);
        debug!(path = %path.display(), "Loading resource");

        if !path.is_file() {
            return Err(Error::not_found(path));
        }

        fs::read(&path).map_err(|e| Error::io(&path, e))
    }

    fn resource_url(&self, logical_path: &str) -> Result<Url> {
        let path = self.resolve(logical_path);
        if !path.is_file() {
            return Err(Error::not_found(path));
        }

        let absolute = std::path::absolute(&path).map_err(|e| Error::io(&path, e))?;
        Url::from_file_path(&absolute).map_err(|()| {
            Error::internal(format!("cannot build URL for {}", absolute.display()))
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
