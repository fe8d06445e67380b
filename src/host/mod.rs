//! Desktop host shell.
//!
//! Runs the UI thread, owns the windows and installs the bridge into each
//! of them once their page has loaded.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Shell`] | Running shell: window set and UI thread |
//! | [`ShellBuilder`] | Fluent configuration builder |
//! | [`WindowOptions`] | Window title and size |
//! | [`Surface`] / [`SurfaceFactory`] | Backend seam for native webviews |
//! | [`HeadlessFactory`] / [`SurfaceProbe`] | In-memory backend |
//! | [`ShellWindows`] | `SPAWN_WINDOW` service backed by the UI thread |
//!
//! # Threading
//!
//! Only the `jwb-ui` thread touches surfaces. Everything else, including
//! Response delivery from the blocking pool, goes through its queue.

// ============================================================================
// Submodules
// ============================================================================

/// Scripts evaluated inside surfaces.
pub mod assets;

/// Fluent builder for shell configuration.
pub mod builder;

/// In-memory surface backend.
pub mod headless;

/// Window options.
pub mod options;

/// Shell and window set.
pub mod shell;

/// Surface backend seam.
pub mod surface;

/// UI thread command loop.
pub(crate) mod ui_thread;

/// `SPAWN_WINDOW` service.
pub mod windows;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::{DEFAULT_ENTRY_PAGE, ShellBuilder};
pub use headless::{FunctionCall, HeadlessFactory, SurfaceProbe};
pub use options::WindowOptions;
pub use shell::Shell;
pub use surface::{BridgeState, EntryPoint, Surface, SurfaceEvents, SurfaceFactory};
pub use ui_thread::UI_THREAD_NAME;
pub use windows::ShellWindows;
