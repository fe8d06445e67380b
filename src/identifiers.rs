//! Type-safe identifiers for bridge messages and UI surfaces.
//!
//! | Type | Owner | Meaning |
//! |------|-------|---------|
//! | [`CorrelationId`] | UI script | Matches a Response to the Request that produced it |
//! | [`SurfaceId`] | Host shell | Identifies one window/view instance |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Constants
// ============================================================================

/// Correlation id used when a failure happens before a request id is known.
pub const GLOBAL_CORRELATION_ID: &str = "global";

// ============================================================================
// CorrelationId
// ============================================================================

/// Opaque correlation token generated by the UI.
///
/// The bridge never interprets the value; it only echoes it back in the
/// Response so the UI can resolve the matching pending call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Wraps an existing token.
    #[inline]
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generates a fresh UUID v4 token.
    ///
    /// Used by native-side clients (tests, demos); the UI normally brings
    /// its own ids.
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the `"global"` sentinel.
    #[inline]
    #[must_use]
    pub fn global() -> Self {
        Self(GLOBAL_CORRELATION_ID.to_string())
    }

    /// Returns `true` if this is the `"global"` sentinel.
    #[inline]
    #[must_use]
    pub fn is_global(&self) -> bool {
        self.0 == GLOBAL_CORRELATION_ID
    }

    /// Returns the token as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CorrelationId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for CorrelationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// ============================================================================
// SurfaceId
// ============================================================================

/// Counter backing [`SurfaceId::next`].
static NEXT_SURFACE_ID: AtomicU32 = AtomicU32::new(1);

/// Identifier of a UI surface (one window + web view).
///
/// Always non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurfaceId(NonZeroU32);

impl SurfaceId {
    /// Creates a surface id, returning `None` for zero.
    #[inline]
    #[must_use]
    pub fn new(id: u32) -> Option<Self> {
        NonZeroU32::new(id).map(Self)
    }

    /// Allocates the next process-unique surface id.
    #[must_use]
    pub fn next() -> Self {
        loop {
            let raw = NEXT_SURFACE_ID.fetch_add(1, Ordering::Relaxed);
            if let Some(id) = Self::new(raw) {
                return id;
            }
        }
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub fn as_u32(&self) -> u32 {
        self.0.get()
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correlation_id_is_transparent_on_the_wire() {
        let id = CorrelationId::new("req-42");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"req-42\"");

        let back: CorrelationId = serde_json::from_str(&json).expect("parse");
        assert_eq!(back, id);
    }

    #[test]
    fn test_global_sentinel() {
        assert!(CorrelationId::global().is_global());
        assert_eq!(CorrelationId::global().as_str(), "global");
        assert!(!CorrelationId::new("abc").is_global());
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = CorrelationId::generate();
        let b = CorrelationId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 36);
    }

    #[test]
    fn test_surface_id_rejects_zero() {
        assert!(SurfaceId::new(0).is_none());
        assert_eq!(SurfaceId::new(7).map(|id| id.as_u32()), Some(7));
    }

    #[test]
    fn test_surface_id_next_is_monotonic() {
        let a = SurfaceId::next();
        let b = SurfaceId::next();
        assert!(b > a);
    }
}
