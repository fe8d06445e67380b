//! Window options.
//!
//! # Example
//!
//! ```
//! use webview_bridge::WindowOptions;
//!
//! let options = WindowOptions::spawned()
//!     .with_title("Sobre")
//!     .with_size(640, 480);
//!
//! assert_eq!(options.width, 640);
//! ```

// ============================================================================
// Constants
// ============================================================================

/// Title of the main window.
pub const MAIN_WINDOW_TITLE: &str = "Webview based - app";

/// Default title of windows opened through `SPAWN_WINDOW`.
pub const SPAWNED_WINDOW_TITLE: &str = "Nova Janela";

// ============================================================================
// WindowOptions
// ============================================================================

/// Title and size of a UI surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowOptions {
    /// Window title.
    pub title: String,

    /// Width in logical pixels.
    pub width: u32,

    /// Height in logical pixels.
    pub height: u32,
}

// ============================================================================
// Constructors
// ============================================================================

impl WindowOptions {
    /// Creates options with an explicit title and size.
    #[inline]
    #[must_use]
    pub fn new(title: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            title: title.into(),
            width,
            height,
        }
    }

    /// Options of the main window (900×600).
    #[inline]
    #[must_use]
    pub fn main() -> Self {
        Self::new(MAIN_WINDOW_TITLE, 900, 600)
    }

    /// Defaults for windows opened from the UI (800×600).
    #[inline]
    #[must_use]
    pub fn spawned() -> Self {
        Self::new(SPAWNED_WINDOW_TITLE, 800, 600)
    }
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self::main()
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl WindowOptions {
    /// Sets the title.
    #[inline]
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the size in logical pixels.
    #[inline]
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_window_defaults() {
        let options = WindowOptions::main();
        assert_eq!(options.title, "Webview based - app");
        assert_eq!((options.width, options.height), (900, 600));
        assert_eq!(WindowOptions::default(), options);
    }

    #[test]
    fn test_spawned_defaults() {
        let options = WindowOptions::spawned();
        assert_eq!(options.title, "Nova Janela");
        assert_eq!((options.width, options.height), (800, 600));
    }

    #[test]
    fn test_builder_methods() {
        let options = WindowOptions::main().with_title("Ajuda").with_size(320, 200);
        assert_eq!(options, WindowOptions::new("Ajuda", 320, 200));
    }
}
