//! UI surface abstraction.
//!
//! A [`Surface`] is one window running the script UI. Backends implement
//! [`SurfaceFactory`] to create them; the shell drives every surface from
//! the UI thread only, so implementations need not be `Send`.
//!
//! # Surface Lifecycle
//!
//! | Step | Who | What |
//! |------|-----|------|
//! | 1 | shell | `SurfaceFactory::create` then `load_url` |
//! | 2 | backend | `SurfaceEvents::page_loaded` when content is ready |
//! | 3 | shell | evaluate client script, `bind_entry_point`, ready callback |
//! | 4 | UI | calls the bound entry point with request text |
//! | 5 | shell | `call_function` with each Response |
//! | 6 | backend or shell | `SurfaceEvents::closed` / `close` |
//!
//! At any point the backend may forward page diagnostics with
//! `SurfaceEvents::script_error` and `SurfaceEvents::console`; the shell
//! logs them.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use tracing::warn;
use url::Url;

use crate::error::Result;
use crate::identifiers::SurfaceId;

use super::WindowOptions;
use super::assets;
use super::ui_thread::{UiCommand, UiHandle};

// ============================================================================
// Types
// ============================================================================

/// Native entry point exposed to the UI. Receives raw request text.
pub type EntryPoint = Arc<dyn Fn(String) + Send + Sync>;

// ============================================================================
// Surface
// ============================================================================

/// A single UI window.
pub trait Surface {
    /// Navigates to `url`.
    ///
    /// # Errors
    ///
    /// Backend-specific navigation failure.
    fn load_url(&mut self, url: &Url) -> Result<()>;

    /// Updates the window title.
    ///
    /// # Errors
    ///
    /// Backend-specific failure.
    fn set_title(&mut self, title: &str) -> Result<()>;

    /// Evaluates a script in the page.
    ///
    /// # Errors
    ///
    /// [`Error::Script`](crate::Error::Script) if evaluation fails.
    fn execute_script(&mut self, script: &str) -> Result<()>;

    /// Exposes `entry` to the page as `window.<name>.postMessage`.
    ///
    /// # Errors
    ///
    /// [`Error::Script`](crate::Error::Script) if binding fails.
    fn bind_entry_point(&mut self, name: &str, entry: EntryPoint) -> Result<()>;

    /// Invokes the page function `window.<name>` if it exists.
    ///
    /// `argument` is JSON text and reaches the function as a parsed value.
    ///
    /// # Errors
    ///
    /// [`Error::Script`](crate::Error::Script) if evaluation fails.
    fn call_function(&mut self, name: &str, argument: Option<&str>) -> Result<()> {
        self.execute_script(&assets::function_call_script(name, argument))
    }

    /// Closes the window. Further calls are ignored by the shell.
    fn close(&mut self);
}

// ============================================================================
// SurfaceFactory
// ============================================================================

/// Creates surfaces for the shell.
///
/// Called on the UI thread.
pub trait SurfaceFactory: Send + Sync {
    /// Creates a window with `options`.
    ///
    /// The backend keeps `events` and reports page loads and user-initiated
    /// closes through it.
    ///
    /// # Errors
    ///
    /// Backend-specific creation failure.
    fn create(
        &self,
        id: SurfaceId,
        options: &WindowOptions,
        events: SurfaceEvents,
    ) -> Result<Box<dyn Surface>>;
}

// ============================================================================
// SurfaceEvents
// ============================================================================

/// Channel through which a backend notifies the shell about one surface.
///
/// Safe to call from any thread.
#[derive(Debug, Clone)]
pub struct SurfaceEvents {
    surface: SurfaceId,
    ui: UiHandle,
}

impl SurfaceEvents {
    pub(crate) fn new(surface: SurfaceId, ui: UiHandle) -> Self {
        Self { surface, ui }
    }

    /// Returns the surface these events belong to.
    #[inline]
    #[must_use]
    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    /// Reports that the surface finished loading its content.
    ///
    /// May be signalled more than once; the bridge is installed only on the
    /// first signal.
    pub fn page_loaded(&self) {
        if self.ui.post(UiCommand::PageLoaded(self.surface)).is_err() {
            warn!(surface = %self.surface, "Page load signal after shell closed");
        }
    }

    /// Reports an uncaught script error in the page.
    pub fn script_error(&self, message: impl Into<String>) {
        let command = UiCommand::ScriptError {
            surface: self.surface,
            message: message.into(),
        };
        if self.ui.post(command).is_err() {
            warn!(surface = %self.surface, "Script error after shell closed");
        }
    }

    /// Reports console or alert output from the page.
    pub fn console(&self, message: impl Into<String>) {
        let command = UiCommand::Console {
            surface: self.surface,
            message: message.into(),
        };
        if self.ui.post(command).is_err() {
            warn!(surface = %self.surface, "Console output after shell closed");
        }
    }

    /// Reports that the user closed the surface.
    pub fn closed(&self) {
        let command = UiCommand::CloseWindow {
            surface: self.surface,
            reply: None,
        };
        if self.ui.post(command).is_err() {
            warn!(surface = %self.surface, "Close signal after shell closed");
        }
    }
}

// ============================================================================
// BridgeState
// ============================================================================

/// Installation state of the bridge in one surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BridgeState {
    /// Entry point not bound yet.
    #[default]
    NotInstalled,
    /// Entry point bound; later load signals are ignored.
    Installed,
}

impl BridgeState {
    /// Moves to [`BridgeState::Installed`].
    ///
    /// Returns `false` if already installed.
    #[inline]
    pub fn install(&mut self) -> bool {
        match self {
            Self::NotInstalled => {
                *self = Self::Installed;
                true
            }
            Self::Installed => false,
        }
    }

    /// Returns to [`BridgeState::NotInstalled`] after a failed install.
    #[inline]
    pub fn revert(&mut self) {
        *self = Self::NotInstalled;
    }

    /// Returns `true` if installed.
    #[inline]
    #[must_use]
    pub fn is_installed(&self) -> bool {
        matches!(self, Self::Installed)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bridge_state_installs_once() {
        let mut state = BridgeState::default();
        assert!(!state.is_installed());
        assert!(state.install());
        assert!(state.is_installed());
        assert!(!state.install());
    }

    #[test]
    fn test_bridge_state_revert() {
        let mut state = BridgeState::NotInstalled;
        assert!(state.install());
        state.revert();
        assert!(state.install());
    }

    #[test]
    fn test_events_post_to_ui_queue() {
        let (ui, mut rx) = UiHandle::channel();
        let surface = SurfaceId::new(7).expect("non-zero");
        let events = SurfaceEvents::new(surface, ui);

        events.page_loaded();
        events.closed();

        assert!(matches!(rx.try_recv(), Ok(UiCommand::PageLoaded(id)) if id == surface));
        assert!(matches!(
            rx.try_recv(),
            Ok(UiCommand::CloseWindow { surface: id, reply: None }) if id == surface
        ));
    }

    #[test]
    fn test_diagnostics_post_to_ui_queue() {
        let (ui, mut rx) = UiHandle::channel();
        let surface = SurfaceId::new(9).expect("non-zero");
        let events = SurfaceEvents::new(surface, ui);

        events.script_error("TypeError: x is undefined");
        events.console("pronto");

        match rx.try_recv() {
            Ok(UiCommand::ScriptError { surface: id, message }) => {
                assert_eq!(id, surface);
                assert_eq!(message, "TypeError: x is undefined");
            }
            other => panic!("unexpected command: {other:?}"),
        }
        match rx.try_recv() {
            Ok(UiCommand::Console { surface: id, message }) => {
                assert_eq!(id, surface);
                assert_eq!(message, "pronto");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_events_after_close_do_not_panic() {
        let (ui, rx) = UiHandle::channel();
        drop(rx);
        let events = SurfaceEvents::new(SurfaceId::next(), ui);
        events.page_loaded();
        events.script_error("late");
        events.console("late");
        events.closed();
    }
}
