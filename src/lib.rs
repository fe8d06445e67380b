//! Webview Bridge - Desktop web-UI host with an async JSON message bridge.
//!
//! This library hosts a script-based UI in native windows and lets that UI
//! call native capabilities (application metadata, file reads, bundled
//! pages, new windows) through a small JSON Request/Response protocol.
//!
//! # Architecture
//!
//! The bridge follows a fire-and-forget, push-back model:
//!
//! - **UI side**: `JWB.send(type, payload)` posts Request text to
//!   `__JWB_BRIDGE__.postMessage` and keeps a promise per correlation id
//! - **Native side**: a [`Dispatcher`] per window decodes, routes and
//!   answers every Request exactly once via `__JWB_HANDLE_RESPONSE`
//!
//! Key design principles:
//!
//! - Only the UI thread touches windows; Responses hop onto it before delivery
//! - Blocking work (file reads, page loads) runs on tokio's blocking pool
//! - Every failure becomes an `ERROR` Response, never a native-call failure
//! - Services are injected, so tests can substitute any of them
//!
//! # Quick Start
//!
//! ```no_run
//! use webview_bridge::{Result, Shell, SurfaceFactory};
//!
//! async fn run(backend: impl SurfaceFactory + 'static) -> Result<()> {
//!     // Serve pages from ./web/public and open index.html in a backend window
//!     let shell = Shell::builder()
//!         .surface_factory(backend)
//!         .resource_root("web/public")
//!         .build()
//!         .await?;
//!
//!     // Run until the user closes the last window
//!     shell.wait_until_closed().await;
//!     Ok(())
//! }
//! ```
//!
//! Window backends implement [`SurfaceFactory`]. [`HeadlessFactory`] runs
//! without a display and exposes each window through a [`SurfaceProbe`].
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`bridge`] | Dispatcher and Response delivery |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`host`] | Shell, windows, surface backends |
//! | [`identifiers`] | Correlation and surface ids |
//! | [`protocol`] | Request/Response wire types |
//! | [`services`] | Native capability services |

// ============================================================================
// Modules
// ============================================================================

/// Dispatcher and Response delivery.
///
/// One [`Dispatcher`] serves one window and never touches it directly.
pub mod bridge;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Desktop host shell.
///
/// Use [`Shell::builder()`] to configure and start it.
pub mod host;

/// Type-safe identifiers.
pub mod identifiers;

/// Bridge protocol message types.
pub mod protocol;

/// Native capability services.
pub mod services;

// ============================================================================
// Re-exports
// ============================================================================

// Bridge types
pub use bridge::{Delivery, Dispatcher, Placement};

// Error types
pub use error::{Error, Result};

// Host types
pub use host::{
    BridgeState, EntryPoint, FunctionCall, HeadlessFactory, Shell, ShellBuilder, ShellWindows,
    Surface, SurfaceEvents, SurfaceFactory, SurfaceProbe, WindowOptions,
};

// Identifier types
pub use identifiers::{CorrelationId, SurfaceId};

// Protocol types
pub use protocol::{
    AppInfo, ErrorCode, ErrorPayload, FileContent, HtmlDocument, Operation, Request, Response,
    ResponseStatus, SpawnedWindow,
};

// Service types
pub use services::{
    AppMetadata, AppService, BundledResources, FileService, LocalFiles, ResourceService,
    Services, SpawnWindowRequest, WindowService,
};
