//! Delivery seam between the dispatcher and the host.
//!
//! The dispatcher hands over fully encoded Response text and never touches
//! a UI surface itself. Implementations decide how the text reaches the UI
//! script context; the host's implementation hops onto the UI thread first.

// ============================================================================
// Delivery
// ============================================================================

/// Receives encoded Responses from a dispatcher.
///
/// Called from whichever thread finished the request: the caller's thread
/// for inline operations, a blocking-pool thread otherwise.
pub trait Delivery: Send + Sync {
    /// Pushes one encoded Response towards the UI.
    fn deliver(&self, response: String);
}

impl<F> Delivery for F
where
    F: Fn(String) + Send + Sync,
{
    fn deliver(&self, response: String) {
        self(response);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use parking_lot::Mutex;

    #[test]
    fn test_closure_is_delivery() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let delivery: Arc<dyn Delivery> = Arc::new(move |text: String| sink.lock().push(text));

        delivery.deliver("{\"id\":\"a\"}".to_string());
        assert_eq!(seen.lock().as_slice(), ["{\"id\":\"a\"}".to_string()]);
    }
}
