//! Native capability services.
//!
//! One trait per operation family. Services are invoked synchronously by
//! the dispatcher, validate their own payloads, and either return a typed
//! result or fail with an [`Error`](crate::error::Error). They hold no
//! per-request state, so one instance is shared by every surface.
//!
//! | Trait | Operation | Default implementation |
//! |-------|-----------|------------------------|
//! | [`AppService`] | `INIT_APP` | [`AppMetadata`] |
//! | [`FileService`] | `READ_FILE` | [`LocalFiles`] |
//! | [`ResourceService`] | `LOAD_HTML` | [`BundledResources`] |
//! | [`WindowService`] | `SPAWN_WINDOW` | [`ShellWindows`](crate::host::ShellWindows) |

// ============================================================================
// Submodules
// ============================================================================

/// Application metadata.
pub mod app;

/// Local filesystem access.
pub mod file;

/// Bundled resources.
pub mod resource;

/// Window lifecycle.
pub mod window;

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

// ============================================================================
// Re-exports
// ============================================================================

pub use app::{AppMetadata, AppService};
pub use file::{FileService, LocalFiles};
pub use resource::{BundledResources, ResourceService};
pub use window::{SpawnWindowRequest, WindowService};

// ============================================================================
// Services
// ============================================================================

/// Service instances injected into a dispatcher.
///
/// Cloning shares the underlying instances.
#[derive(Clone)]
pub struct Services {
    /// INIT_APP handler.
    pub app: Arc<dyn AppService>,
    /// READ_FILE handler.
    pub files: Arc<dyn FileService>,
    /// LOAD_HTML handler.
    pub resources: Arc<dyn ResourceService>,
    /// SPAWN_WINDOW handler.
    pub windows: Arc<dyn WindowService>,
}

impl Services {
    /// Bundles the given service instances.
    #[must_use]
    pub fn new(
        app: Arc<dyn AppService>,
        files: Arc<dyn FileService>,
        resources: Arc<dyn ResourceService>,
        windows: Arc<dyn WindowService>,
    ) -> Self {
        Self {
            app,
            files,
            resources,
            windows,
        }
    }

    /// Replaces the app service.
    #[must_use]
    pub fn with_app(mut self, app: Arc<dyn AppService>) -> Self {
        self.app = app;
        self
    }

    /// Replaces the file service.
    #[must_use]
    pub fn with_files(mut self, files: Arc<dyn FileService>) -> Self {
        self.files = files;
        self
    }

    /// Replaces the resource service.
    #[must_use]
    pub fn with_resources(mut self, resources: Arc<dyn ResourceService>) -> Self {
        self.resources = resources;
        self
    }

    /// Replaces the window service.
    #[must_use]
    pub fn with_windows(mut self, windows: Arc<dyn WindowService>) -> Self {
        self.windows = windows;
        self
    }
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}
