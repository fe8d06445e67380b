//! Bridge protocol message types.
//!
//! Pure data: encode/decode between the JSON wire text and in-memory
//! values, no I/O.
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | `Request` | UI → Native | Operation call, submitted via `__JWB_BRIDGE__.postMessage` |
//! | `Response` | Native → UI | Outcome, pushed into `__JWB_HANDLE_RESPONSE` |
//!
//! Correlation is carried in-band: the Response echoes the Request `id`.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `operation` | Closed set of operation kinds |
//! | `payload` | Error codes and typed result payloads |
//! | `request` | Request and Response types |

// ============================================================================
// Submodules
// ============================================================================

/// Operation kinds.
pub mod operation;

/// Error codes and typed result payloads.
pub mod payload;

/// Request and Response message types.
pub mod request;

// ============================================================================
// Constants
// ============================================================================

/// Protocol version assumed when a Request omits `protocol`.
pub const PROTOCOL_VERSION: &str = "1.0";

// ============================================================================
// Re-exports
// ============================================================================

pub use operation::Operation;
pub use payload::{AppInfo, ErrorCode, ErrorPayload, FileContent, HtmlDocument, SpawnedWindow};
pub use request::{Request, Response, ResponseStatus};
