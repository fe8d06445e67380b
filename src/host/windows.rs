//! [`WindowService`] backed by the shell's UI thread.

// ============================================================================
// Imports
// ============================================================================

use serde_json::Value;
use tracing::debug;

use crate::error::Result;
use crate::protocol::SpawnedWindow;
use crate::services::{SpawnWindowRequest, WindowService};

use super::WindowOptions;
use super::ui_thread::{UiCommand, UiHandle};

// ============================================================================
// ShellWindows
// ============================================================================

/// Opens windows by queueing work for the UI thread.
///
/// `spawn_window` returns as soon as the request is queued. If creation
/// later fails on the UI thread the failure is logged; the Response has
/// already acknowledged the request.
#[derive(Debug, Clone)]
pub struct ShellWindows {
    ui: UiHandle,
    defaults: WindowOptions,
}

impl ShellWindows {
    pub(crate) fn new(ui: UiHandle, defaults: WindowOptions) -> Self {
        Self { ui, defaults }
    }

    /// Returns the options applied to fields a request leaves out.
    #[inline]
    #[must_use]
    pub fn defaults(&self) -> &WindowOptions {
        &self.defaults
    }
}

impl WindowService for ShellWindows {
    fn spawn_window(&self, payload: &Value) -> Result<SpawnedWindow> {
        let request = SpawnWindowRequest::from_payload(payload)?;
        let options = request.resolve(&self.defaults);

        debug!(
            page = %request.html_path,
            title = %options.title,
            width = options.width,
            height = options.height,
            "Queueing window"
        );

        self.ui.post(UiCommand::OpenWindow {
            page: request.html_path.clone(),
            options: options.clone(),
            reply: None,
        })?;

        Ok(SpawnedWindow {
            success: true,
            html_path: request.html_path,
            title: options.title,
            width: options.width,
            height: options.height,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
