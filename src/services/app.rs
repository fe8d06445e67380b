//! Application metadata service (`INIT_APP`).

// ============================================================================
// Imports
// ============================================================================

use crate::error::Result;
use crate::protocol::{AppInfo, PROTOCOL_VERSION};

// ============================================================================
// AppService
// ============================================================================

/// Provides application metadata to the UI.
pub trait AppService: Send + Sync {
    /// Returns the data the UI needs at startup.
    ///
    /// # Errors
    ///
    /// Implementations should not fail; any error is reported as
    /// `INTERNAL_ERROR`.
    fn init_data(&self) -> Result<AppInfo>;
}

// ============================================================================
// AppMetadata
// ============================================================================

/// Static application metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppMetadata {
    /// Application name.
    pub name: String,
    /// Application version.
    pub version: String,
}

impl AppMetadata {
    /// Creates metadata with the given name and version.
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl Default for AppMetadata {
    fn default() -> Self {
        Self::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    }
}

impl AppService for AppMetadata {
    fn init_data(&self) -> Result<AppInfo> {
        Ok(AppInfo {
            app_name: self.name.clone(),
            version: self.version.clone(),
            protocol: PROTOCOL_VERSION.to_string(),
            platform: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_data_reports_metadata() {
        let info = AppMetadata::new("Notes", "2.1.0").init_data().expect("init");
        assert_eq!(info.app_name, "Notes");
        assert_eq!(info.version, "2.1.0");
        assert_eq!(info.protocol, PROTOCOL_VERSION);
        assert_eq!(info.platform, std::env::consts::OS);
    }

    #[test]
    fn test_default_uses_package_metadata() {
        let metadata = AppMetadata::default();
        assert_eq!(metadata.name, "webview-bridge");
        assert!(!metadata.version.is_empty());
    }
}
