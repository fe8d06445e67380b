//! Operation kinds a Request can name.
//!
//! The set is closed; wire strings are case-sensitive.
//!
//! | Wire string | Native handler |
//! |-------------|----------------|
//! | `INIT_APP` | app metadata |
//! | `READ_FILE` | filesystem read |
//! | `SPAWN_WINDOW` | new UI surface |
//! | `LOAD_HTML` | bundled resource |
//! | `GET_APP_INFO` | none |
//! | `WRITE_FILE` | none |
//! | `LIST_DIRECTORY` | none |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

use super::payload::ErrorCode;

// ============================================================================
// Operation
// ============================================================================

/// Closed enumeration of bridge operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operation {
    /// Fetch application metadata.
    InitApp,
    /// Read a file from the local filesystem.
    ReadFile,
    /// Open a new UI surface.
    SpawnWindow,
    /// Load a bundled HTML resource.
    LoadHtml,
    /// Reserved.
    GetAppInfo,
    /// Reserved.
    WriteFile,
    /// Reserved.
    ListDirectory,
}

impl Operation {
    /// Every operation in wire order.
    pub const ALL: [Operation; 7] = [
        Self::InitApp,
        Self::ReadFile,
        Self::SpawnWindow,
        Self::LoadHtml,
        Self::GetAppInfo,
        Self::WriteFile,
        Self::ListDirectory,
    ];

    /// Returns the wire string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InitApp => "INIT_APP",
            Self::ReadFile => "READ_FILE",
            Self::SpawnWindow => "SPAWN_WINDOW",
            Self::LoadHtml => "LOAD_HTML",
            Self::GetAppInfo => "GET_APP_INFO",
            Self::WriteFile => "WRITE_FILE",
            Self::ListDirectory => "LIST_DIRECTORY",
        }
    }

    /// Returns `true` if a native handler exists.
    #[must_use]
    pub const fn is_implemented(self) -> bool {
        matches!(
            self,
            Self::InitApp | Self::ReadFile | Self::SpawnWindow | Self::LoadHtml
        )
    }

    /// Error code reported for failures of this operation family.
    #[must_use]
    pub const fn error_code(self) -> ErrorCode {
        match self {
            Self::ReadFile => ErrorCode::FileReadError,
            Self::SpawnWindow => ErrorCode::WindowSpawnError,
            Self::LoadHtml => ErrorCode::HtmlLoadError,
            Self::InitApp => ErrorCode::InternalError,
            Self::GetAppInfo | Self::WriteFile | Self::ListDirectory => ErrorCode::NotImplemented,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_strings_match_serde() {
        for op in Operation::ALL {
            let json = serde_json::to_string(&op).expect("serialize");
            assert_eq!(json, format!("\"{}\"", op.as_str()));
        }
    }

    #[test]
    fn test_wire_strings_are_case_sensitive() {
        assert!(serde_json::from_str::<Operation>("\"READ_FILE\"").is_ok());
        assert!(serde_json::from_str::<Operation>("\"read_file\"").is_err());
        assert!(serde_json::from_str::<Operation>("\"ReadFile\"").is_err());
    }

    #[test]
    fn test_only_four_are_implemented() {
        let implemented: Vec<_> = Operation::ALL
            .into_iter()
            .filter(|op| op.is_implemented())
            .collect();
        assert_eq!(
            implemented,
            vec![
                Operation::InitApp,
                Operation::ReadFile,
                Operation::SpawnWindow,
                Operation::LoadHtml
            ]
        );
    }

    #[test]
    fn test_error_codes_per_family() {
        assert_eq!(Operation::ReadFile.error_code(), ErrorCode::FileReadError);
        assert_eq!(Operation::SpawnWindow.error_code(), ErrorCode::WindowSpawnError);
        assert_eq!(Operation::LoadHtml.error_code(), ErrorCode::HtmlLoadError);
        assert_eq!(Operation::InitApp.error_code(), ErrorCode::InternalError);
        assert_eq!(Operation::ListDirectory.error_code(), ErrorCode::NotImplemented);
    }
}
