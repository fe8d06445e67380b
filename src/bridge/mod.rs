//! Native side of the UI message bridge.
//!
//! The UI calls `__JWB_BRIDGE__.postMessage(json)`; the call returns
//! immediately and the Response arrives later through
//! `__JWB_HANDLE_RESPONSE`. Correlation is in-band, so the native side
//! keeps no table of pending requests.
//!
//! # Request Lifecycle
//!
//! ```text
//! Received → Decoded → Routed → Executing | ExecutingAsync → ResponseBuilt → Delivered
//!     │                                                                        ▲
//!     └──────────────── decode failure (id or "global") ───────────────────────┘
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `delivery` | Seam through which encoded Responses leave the dispatcher |
//! | `dispatcher` | Decoding, routing, placement, error shaping |

// ============================================================================
// Submodules
// ============================================================================

/// Response delivery seam.
pub mod delivery;

/// Request dispatcher.
pub mod dispatcher;

// ============================================================================
// Constants
// ============================================================================

/// Name of the native object bound into the UI script context.
pub const BRIDGE_OBJECT: &str = "__JWB_BRIDGE__";

/// UI callback receiving every Response.
pub const RESPONSE_CALLBACK: &str = "__JWB_HANDLE_RESPONSE";

/// UI callback signalling that native calls are safe.
pub const READY_CALLBACK: &str = "__JWB_BRIDGE_READY";

// ============================================================================
// Re-exports
// ============================================================================

pub use delivery::Delivery;
pub use dispatcher::{Dispatcher, Placement};
