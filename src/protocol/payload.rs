//! Typed payloads carried inside Responses.
//!
//! Services return these structs; the dispatcher turns them into the
//! opaque `payload` value of a Response. Field names follow the camelCase
//! the UI scripts expect.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Error;

use super::Operation;

// ============================================================================
// ErrorCode
// ============================================================================

/// Machine-readable error code in an `ERROR` payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// READ_FILE failed.
    FileReadError,
    /// SPAWN_WINDOW failed.
    WindowSpawnError,
    /// LOAD_HTML failed.
    HtmlLoadError,
    /// Uncategorized failure.
    InternalError,
    /// Request could not be decoded.
    DecodeError,
    /// Operation has no native handler.
    NotImplemented,
}

impl ErrorCode {
    /// Returns the wire string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FileReadError => "FILE_READ_ERROR",
            Self::WindowSpawnError => "WINDOW_SPAWN_ERROR",
            Self::HtmlLoadError => "HTML_LOAD_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
            Self::DecodeError => "DECODE_ERROR",
            Self::NotImplemented => "NOT_IMPLEMENTED",
        }
    }

    /// Picks the code for `error` raised while serving `operation`.
    ///
    /// Protocol-level failures have their own codes; everything else is
    /// reported under the operation family's code.
    #[must_use]
    pub fn for_error(error: &Error, operation: Option<Operation>) -> Self {
        match error {
            Error::Decode { .. } => Self::DecodeError,
            Error::NotImplemented { .. } => Self::NotImplemented,
            Error::Encode(_) => Self::InternalError,
            _ => operation.map_or(Self::InternalError, Operation::error_code),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// ErrorPayload
// ============================================================================

/// Payload of an `ERROR` Response.
///
/// ```json
/// { "code": "FILE_READ_ERROR", "message": "Not found: /tmp/x.txt" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Machine-readable code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
}

impl ErrorPayload {
    /// Creates an error payload.
    #[inline]
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Shapes a crate error raised while serving `operation`.
    #[must_use]
    pub fn from_error(error: &Error, operation: Option<Operation>) -> Self {
        Self::new(ErrorCode::for_error(error, operation), error.to_string())
    }
}

// ============================================================================
// Result Payloads
// ============================================================================

/// INIT_APP result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppInfo {
    /// Application name.
    pub app_name: String,
    /// Application version.
    pub version: String,
    /// Bridge protocol version.
    pub protocol: String,
    /// Host operating system.
    pub platform: String,
    /// Host CPU architecture.
    pub arch: String,
}

/// READ_FILE result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileContent {
    /// File content decoded as UTF-8.
    pub content: String,
    /// Size in bytes.
    pub size: u64,
    /// Path as requested.
    pub path: String,
    /// Path resolved against the working directory.
    pub absolute_path: String,
}

/// LOAD_HTML result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HtmlDocument {
    /// HTML text.
    pub content: String,
    /// Logical resource path as requested.
    pub path: String,
}

/// SPAWN_WINDOW result.
///
/// Acknowledges the request to create a window; creation itself happens
/// later on the UI thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpawnedWindow {
    /// Always `true` for an accepted request.
    pub success: bool,
    /// Bundled page the window will load.
    pub html_path: String,
    /// Resolved title.
    pub title: String,
    /// Resolved width in logical pixels.
    pub width: u32,
    /// Resolved height in logical pixels.
    pub height: u32,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::identifiers::CorrelationId;

    #[test]
    fn test_error_code_wire_strings() {
        let json = serde_json::to_value(ErrorCode::FileReadError).expect("serialize");
        assert_eq!(json, json!("FILE_READ_ERROR"));
        assert_eq!(ErrorCode::NotImplemented.as_str(), "NOT_IMPLEMENTED");
    }

    #[test]
    fn test_error_payload_shape() {
        let payload = ErrorPayload::new(ErrorCode::HtmlLoadError, "missing");
        let json = serde_json::to_value(&payload).expect("serialize");
        assert_eq!(json, json!({"code": "HTML_LOAD_ERROR", "message": "missing"}));
    }

    #[test]
    fn test_code_for_service_errors_follows_operation() {
        let err = Error::not_found("/x");
        assert_eq!(
            ErrorCode::for_error(&err, Some(Operation::ReadFile)),
            ErrorCode::FileReadError
        );
        assert_eq!(
            ErrorCode::for_error(&err, Some(Operation::LoadHtml)),
            ErrorCode::HtmlLoadError
        );
        assert_eq!(ErrorCode::for_error(&err, None), ErrorCode::InternalError);
    }

    #[test]
    fn test_code_for_protocol_errors() {
        let decode = Error::decode(Some(CorrelationId::new("a")), "bad");
        assert_eq!(
            ErrorCode::for_error(&decode, Some(Operation::ReadFile)),
            ErrorCode::DecodeError
        );

        let missing = Error::not_implemented(Operation::GetAppInfo);
        assert_eq!(
            ErrorCode::for_error(&missing, Some(Operation::GetAppInfo)),
            ErrorCode::NotImplemented
        );
    }

    #[test]
    fn test_file_content_uses_camel_case() {
        let content = FileContent {
            content: "hi".into(),
            size: 2,
            path: "a.txt".into(),
            absolute_path: "/tmp/a.txt".into(),
        };
        let json = serde_json::to_value(&content).expect("serialize");
        assert_eq!(json["absolutePath"], "/tmp/a.txt");
        assert_eq!(json["size"], 2);
    }

    #[test]
    fn test_spawned_window_shape() {
        let window = SpawnedWindow {
            success: true,
            html_path: "about.html".into(),
            title: "Nova Janela".into(),
            width: 800,
            height: 600,
        };
        let json = serde_json::to_value(&window).expect("serialize");
        assert_eq!(
            json,
            json!({
                "success": true,
                "htmlPath": "about.html",
                "title": "Nova Janela",
                "width": 800,
                "height": 600
            })
        );
    }
}
