//! Builder pattern for shell configuration.
//!
//! Provides a fluent API for configuring and starting a [`Shell`].
//!
//! # Example
//!
//! ```no_run
//! use webview_bridge::{AppMetadata, HeadlessFactory, Shell, WindowOptions};
//!
//! # async fn example() -> webview_bridge::Result<()> {
//! let shell = Shell::builder()
//!     .surface_factory(HeadlessFactory::new())
//!     .resource_root("web/public")
//!     .entry_page("index.html")
//!     .main_window(WindowOptions::main().with_size(1024, 768))
//!     .app_metadata(AppMetadata::new("notes", "0.3.0"))
//!     .build()
//!     .await?;
//!
//! shell.wait_until_closed().await;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::runtime::Handle;

use crate::error::{Error, Result};
use crate::services::{
    AppMetadata, AppService, BundledResources, FileService, LocalFiles, ResourceService, Services,
    WindowService, resource::DEFAULT_RESOURCE_ROOT,
};

use super::shell::{Shell, ShellConfig};
use super::surface::SurfaceFactory;
use super::ui_thread::UiHandle;
use super::{ShellWindows, WindowOptions};

// ============================================================================
// Constants
// ============================================================================

/// Page loaded into the main window.
pub const DEFAULT_ENTRY_PAGE: &str = "index.html";

// ============================================================================
// ShellBuilder
// ============================================================================

/// Builder for configuring a [`Shell`].
///
/// Use [`Shell::builder()`] to create a new builder.
#[derive(Clone)]
pub struct ShellBuilder {
    /// Directory bundled resources are served from.
    resource_root: PathBuf,
    /// Logical path of the main window's page.
    entry_page: String,
    /// Main window title and size.
    main_window: WindowOptions,
    /// Defaults for `SPAWN_WINDOW`.
    spawn_defaults: WindowOptions,
    /// Metadata reported by `INIT_APP`.
    metadata: AppMetadata,
    /// Surface backend.
    factory: Option<Arc<dyn SurfaceFactory>>,
    /// Runtime for offloaded work.
    runtime: Option<Handle>,
    /// Service overrides.
    app: Option<Arc<dyn AppService>>,
    files: Option<Arc<dyn FileService>>,
    resources: Option<Arc<dyn ResourceService>>,
    windows: Option<Arc<dyn WindowService>>,
}

impl Default for ShellBuilder {
    fn default() -> Self {
        Self {
            resource_root: PathBuf::from(DEFAULT_RESOURCE_ROOT),
            entry_page: DEFAULT_ENTRY_PAGE.to_string(),
            main_window: WindowOptions::main(),
            spawn_defaults: WindowOptions::spawned(),
            metadata: AppMetadata::default(),
            factory: None,
            runtime: None,
            app: None,
            files: None,
            resources: None,
            windows: None,
        }
    }
}

impl fmt::Debug for ShellBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShellBuilder")
            .field("resource_root", &self.resource_root)
            .field("entry_page", &self.entry_page)
            .field("main_window", &self.main_window)
            .field("spawn_defaults", &self.spawn_defaults)
            .field("metadata", &self.metadata)
            .field("custom_factory", &self.factory.is_some())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// ShellBuilder Implementation
// ============================================================================

impl ShellBuilder {
    /// Creates a builder with default settings.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the directory bundled pages are served from.
    ///
    /// # Arguments
    ///
    /// * `path` - Resource root (default `web/public`)
    #[inline]
    #[must_use]
    pub fn resource_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.resource_root = path.into();
        self
    }

    /// Sets the page loaded into the main window.
    ///
    /// # Arguments
    ///
    /// * `page` - Logical path under the resource root (default `index.html`)
    #[inline]
    #[must_use]
    pub fn entry_page(mut self, page: impl Into<String>) -> Self {
        self.entry_page = page.into();
        self
    }

    /// Sets the main window's title and size.
    #[inline]
    #[must_use]
    pub fn main_window(mut self, options: WindowOptions) -> Self {
        self.main_window = options;
        self
    }

    /// Sets the values `SPAWN_WINDOW` uses for omitted fields.
    #[inline]
    #[must_use]
    pub fn spawn_defaults(mut self, options: WindowOptions) -> Self {
        self.spawn_defaults = options;
        self
    }

    /// Sets the name and version reported by `INIT_APP`.
    #[inline]
    #[must_use]
    pub fn app_metadata(mut self, metadata: AppMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Sets the surface backend. Required.
    ///
    /// Native webview backends implement [`SurfaceFactory`];
    /// [`HeadlessFactory`](super::HeadlessFactory) runs without a display.
    #[inline]
    #[must_use]
    pub fn surface_factory(mut self, factory: impl SurfaceFactory + 'static) -> Self {
        self.factory = Some(Arc::new(factory));
        self
    }

    /// Sets the runtime whose blocking pool runs file reads.
    ///
    /// Defaults to the runtime `build` is awaited on.
    #[inline]
    #[must_use]
    pub fn runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    /// Replaces the `INIT_APP` service.
    #[inline]
    #[must_use]
    pub fn app_service(mut self, service: Arc<dyn AppService>) -> Self {
        self.app = Some(service);
        self
    }

    /// Replaces the `READ_FILE` service.
    #[inline]
    #[must_use]
    pub fn file_service(mut self, service: Arc<dyn FileService>) -> Self {
        self.files = Some(service);
        self
    }

    /// Replaces the resource service behind `LOAD_HTML` and page loading.
    ///
    /// The resource root is not checked when this is set.
    #[inline]
    #[must_use]
    pub fn resource_service(mut self, service: Arc<dyn ResourceService>) -> Self {
        self.resources = Some(service);
        self
    }

    /// Replaces the `SPAWN_WINDOW` service.
    #[inline]
    #[must_use]
    pub fn window_service(mut self, service: Arc<dyn WindowService>) -> Self {
        self.windows = Some(service);
        self
    }

    /// Validates the configuration, starts the UI thread and opens the
    /// main window.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if no surface factory was set
    /// - [`Error::Config`] if the resource root is not a directory
    /// - [`Error::Config`] if the entry page is empty or a window has zero size
    /// - [`Error::Config`] if no tokio runtime is available
    /// - [`Error::NotFound`] if the entry page is not in the bundle
    pub async fn build(self) -> Result<Shell> {
        let resources = self.validate_resources()?;
        let entry_page = self.validate_entry_page()?;
        validate_window("main window", &self.main_window)?;
        validate_window("spawn defaults", &self.spawn_defaults)?;
        let factory = self.validate_factory()?;
        let runtime = self.validate_runtime()?;

        let (ui, rx) = UiHandle::channel();

        let windows = self.windows.unwrap_or_else(|| {
            Arc::new(ShellWindows::new(ui.clone(), self.spawn_defaults.clone()))
                as Arc<dyn WindowService>
        });
        let services = Services::new(
            self.app
                .unwrap_or_else(|| Arc::new(self.metadata) as Arc<dyn AppService>),
            self.files
                .unwrap_or_else(|| Arc::new(LocalFiles::new()) as Arc<dyn FileService>),
            resources,
            windows,
        );

        let config = ShellConfig {
            entry_page,
            main_window: self.main_window,
            factory,
            services,
            runtime,
        };

        Shell::launch(ui, rx, config).await
    }
}

// ============================================================================
// Validation
// ============================================================================

impl ShellBuilder {
    /// Returns the resource service, checking the root if it is ours.
    fn validate_resources(&self) -> Result<Arc<dyn ResourceService>> {
        if let Some(resources) = &self.resources {
            return Ok(Arc::clone(resources));
        }

        if !self.resource_root.is_dir() {
            return Err(Error::config(format!(
                "Resource root not found at: {}\n\
                 Use .resource_root() to point at the directory holding the UI pages.",
                self.resource_root.display()
            )));
        }

        Ok(Arc::new(BundledResources::new(self.resource_root.clone())))
    }

    /// Validates the entry page.
    fn validate_entry_page(&self) -> Result<String> {
        let page = self.entry_page.trim();
        if page.is_empty() {
            return Err(Error::config(
                "Entry page is required. Use .entry_page() to set it.\n\
                 Example: Shell::builder().entry_page(\"index.html\")",
            ));
        }
        Ok(page.to_string())
    }

    /// Returns the surface backend.
    fn validate_factory(&self) -> Result<Arc<dyn SurfaceFactory>> {
        self.factory.clone().ok_or_else(|| {
            Error::config(
                "A surface factory is required. Use .surface_factory() to set the window backend.\n\
                 Example: Shell::builder().surface_factory(HeadlessFactory::new())",
            )
        })
    }

    /// Resolves the runtime handle.
    fn validate_runtime(&self) -> Result<Handle> {
        match &self.runtime {
            Some(handle) => Ok(handle.clone()),
            None => Handle::try_current().map_err(|_| {
                Error::config(
                    "A tokio runtime is required. Call build() inside a runtime \
                     or pass one with .runtime().",
                )
            }),
        }
    }
}

/// Rejects zero-sized windows.
fn validate_window(label: &str, options: &WindowOptions) -> Result<()> {
    if options.width == 0 || options.height == 0 {
        return Err(Error::config(format!(
            "{label} size must be positive, got {}x{}",
            options.width, options.height
        )));
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use crate::host::HeadlessFactory;

    #[test]
    fn test_defaults() {
        let builder = ShellBuilder::new();
        assert_eq!(builder.resource_root, PathBuf::from("web/public"));
        assert_eq!(builder.entry_page, "index.html");
        assert_eq!(builder.main_window, WindowOptions::main());
        assert_eq!(builder.spawn_defaults, WindowOptions::spawned());
        assert!(builder.factory.is_none());
    }

    #[test]
    fn test_setters() {
        let builder = ShellBuilder::new()
            .resource_root("/srv/ui")
            .entry_page("home.html")
            .spawn_defaults(WindowOptions::new("Filha", 300, 200))
            .app_metadata(AppMetadata::new("x", "1"));

        assert_eq!(builder.resource_root, PathBuf::from("/srv/ui"));
        assert_eq!(builder.entry_page, "home.html");
        assert_eq!(builder.spawn_defaults.title, "Filha");
        assert_eq!(builder.metadata.name, "x");
    }

    #[test]
    fn test_builder_is_clone() {
        let builder = ShellBuilder::new().entry_page("a.html");
        let cloned = builder.clone();
        assert_eq!(builder.entry_page, cloned.entry_page);
    }

    #[tokio::test]
    async fn test_build_fails_without_resource_root() {
        let err = ShellBuilder::new()
            .resource_root("/nonexistent/web/public")
            .build()
            .await
            .expect_err("should fail");

        assert!(matches!(err, Error::Config { .. }));
        assert!(err.to_string().contains("Resource root"));
    }

    #[tokio::test]
    async fn test_build_fails_with_empty_entry_page() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = ShellBuilder::new()
            .resource_root(dir.path())
            .entry_page("  ")
            .build()
            .await
            .expect_err("should fail");

        assert!(err.to_string().contains("Entry page"));
    }

    #[tokio::test]
    async fn test_build_fails_with_zero_sized_window() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = ShellBuilder::new()
            .resource_root(dir.path())
            .main_window(WindowOptions::main().with_size(0, 600))
            .build()
            .await
            .expect_err("should fail");

        assert!(matches!(err, Error::Config { .. }));
    }

    #[tokio::test]
    async fn test_build_fails_without_surface_factory() {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(dir.path().join("index.html"), "<p>ok</p>").expect("write");

        let err = ShellBuilder::new()
            .resource_root(dir.path())
            .build()
            .await
            .expect_err("should fail");

        assert!(matches!(err, Error::Config { .. }));
        assert!(err.to_string().contains("surface factory"));
    }

    #[tokio::test]
    async fn test_build_fails_with_missing_entry_page() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = ShellBuilder::new()
            .resource_root(dir.path())
            .surface_factory(HeadlessFactory::new())
            .build()
            .await
            .expect_err("should fail");

        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_build_opens_main_window() {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(dir.path().join("index.html"), "<p>ok</p>").expect("write");
        let factory = HeadlessFactory::new();

        let shell = ShellBuilder::new()
            .resource_root(dir.path())
            .surface_factory(factory.clone())
            .build()
            .await
            .expect("build");

        assert_eq!(factory.probes().len(), 1);
        assert_eq!(factory.probes()[0].id(), shell.main_window());
        shell.shutdown().await.expect("shutdown");
    }

    #[test]
    fn test_runtime_required_outside_tokio() {
        let err = ShellBuilder::new()
            .validate_runtime()
            .expect_err("no runtime");
        assert!(err.to_string().contains("tokio runtime"));
    }
}
