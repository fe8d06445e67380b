//! Error types for the bridge and host shell.
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]. The
//! dispatcher never lets an [`Error`] escape to the UI as a failure of the
//! native call itself; it is shaped into an `ERROR` Response instead (see
//! [`crate::protocol::ErrorPayload`]).
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Protocol | [`Error::Decode`], [`Error::Encode`], [`Error::NotImplemented`] |
//! | Service | [`Error::InvalidPayload`], [`Error::NotFound`], [`Error::Io`], [`Error::Internal`] |
//! | Host | [`Error::Config`], [`Error::SurfaceNotFound`], [`Error::ShellClosed`], [`Error::Script`], [`Error::Timeout`] |
//! | External | [`Error::ChannelClosed`] |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::path::PathBuf;
use std::result::Result as StdResult;

use thiserror::Error;
use tokio::sync::oneshot::error::RecvError;

use crate::identifiers::{CorrelationId, SurfaceId};
use crate::protocol::Operation;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// Malformed or unrecognized Request.
    ///
    /// `id` carries the correlation id when it could still be recovered
    /// from the raw message.
    #[error("Invalid request: {message}")]
    Decode {
        /// Correlation id recovered from the raw message, if any.
        id: Option<CorrelationId>,
        /// Description of the decode failure.
        message: String,
    },

    /// Response could not be serialized.
    #[error("Failed to encode response: {0}")]
    Encode(#[source] serde_json::Error),

    /// Operation is part of the protocol but has no native handler.
    #[error("Operation not implemented: {operation}")]
    NotImplemented {
        /// The unhandled operation.
        operation: Operation,
    },

    // ========================================================================
    // Service Errors
    // ========================================================================
    /// Recognized operation, but its payload failed validation.
    #[error("Invalid payload: {message}")]
    InvalidPayload {
        /// Description of the validation failure.
        message: String,
    },

    /// Referenced file or bundled resource does not exist.
    #[error("Not found: {}", path.display())]
    NotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// I/O failure other than not-found.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: IoError,
    },

    /// Uncategorized failure, including panics caught at the bridge boundary.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the failure.
        message: String,
    },

    // ========================================================================
    // Host Errors
    // ========================================================================
    /// Shell configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// Surface does not exist (never created or already closed).
    #[error("Surface not found: {surface_id}")]
    SurfaceNotFound {
        /// The missing surface.
        surface_id: SurfaceId,
    },

    /// The UI thread has stopped accepting work.
    #[error("Shell closed")]
    ShellClosed,

    /// Script evaluation or entry point binding failed inside a surface.
    #[error("Script error: {message}")]
    Script {
        /// Error message reported by the surface.
        message: String,
    },

    /// Operation timeout.
    #[error("Timeout after {timeout_ms}ms: {operation}")]
    Timeout {
        /// Description of the operation that timed out.
        operation: String,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// Reply channel dropped before answering.
    #[error("Channel closed")]
    ChannelClosed(#[from] RecvError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a decode error.
    #[inline]
    pub fn decode(id: Option<CorrelationId>, message: impl Into<String>) -> Self {
        Self::Decode {
            id,
            message: message.into(),
        }
    }

    /// Creates an invalid payload error.
    #[inline]
    pub fn invalid_payload(message: impl Into<String>) -> Self {
        Self::InvalidPayload {
            message: message.into(),
        }
    }

    /// Creates a not found error.
    #[inline]
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Creates an I/O error, mapping `ErrorKind::NotFound` to [`Error::NotFound`].
    #[inline]
    pub fn io(path: impl Into<PathBuf>, source: IoError) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            return Self::NotFound { path };
        }
        Self::Io { path, source }
    }

    /// Creates an internal error.
    #[inline]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Creates a not implemented error.
    #[inline]
    pub fn not_implemented(operation: Operation) -> Self {
        Self::NotImplemented { operation }
    }

    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a surface not found error.
    #[inline]
    pub fn surface_not_found(surface_id: SurfaceId) -> Self {
        Self::SurfaceNotFound { surface_id }
    }

    /// Creates a script error.
    #[inline]
    pub fn script(message: impl Into<String>) -> Self {
        Self::Script {
            message: message.into(),
        }
    }

    /// Creates a timeout error.
    #[inline]
    pub fn timeout(operation: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_ms,
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if the request itself could not be decoded.
    #[inline]
    #[must_use]
    pub fn is_decode_error(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }

    /// Returns `true` if the error was caused by the caller's input.
    #[inline]
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Decode { .. } | Self::InvalidPayload { .. } | Self::NotFound { .. }
        )
    }

    /// Returns `true` if the shell can no longer serve requests.
    #[inline]
    #[must_use]
    pub fn is_shell_closed(&self) -> bool {
        matches!(self, Self::ShellClosed | Self::ChannelClosed(_))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::ErrorKind;

    #[test]
    fn test_error_display() {
        let err = Error::invalid_payload("'path' is required");
        assert_eq!(err.to_string(), "Invalid payload: 'path' is required");
    }

    #[test]
    fn test_not_found_display() {
        let err = Error::not_found("/definitely/missing/file.txt");
        assert_eq!(err.to_string(), "Not found: /definitely/missing/file.txt");
    }

    #[test]
    fn test_io_maps_not_found_kind() {
        let err = Error::io("a.txt", IoError::new(ErrorKind::NotFound, "gone"));
        assert!(matches!(err, Error::NotFound { .. }));

        let err = Error::io("a.txt", IoError::new(ErrorKind::PermissionDenied, "denied"));
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_not_implemented_display() {
        let err = Error::not_implemented(Operation::WriteFile);
        assert_eq!(err.to_string(), "Operation not implemented: WRITE_FILE");
    }

    #[test]
    fn test_is_client_error() {
        assert!(Error::decode(None, "bad json").is_client_error());
        assert!(Error::invalid_payload("x").is_client_error());
        assert!(Error::not_found("x").is_client_error());
        assert!(!Error::internal("x").is_client_error());
    }

    #[test]
    fn test_is_shell_closed() {
        assert!(Error::ShellClosed.is_shell_closed());
        assert!(!Error::config("x").is_shell_closed());
    }

    #[test]
    fn test_decode_keeps_recovered_id() {
        let err = Error::decode(Some(CorrelationId::new("abc")), "unknown variant");
        match err {
            Error::Decode { id, .. } => assert_eq!(id, Some(CorrelationId::new("abc"))),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
