//! Host shell.
//!
//! Owns the UI thread and the set of open windows. Each window gets its
//! own [`Dispatcher`] once its page has loaded; that dispatcher's
//! Responses hop back onto the UI thread before they touch the surface.
//!
//! # Bridge Installation
//!
//! ```text
//! page loaded ──► BridgeState::install()
//!                   │ false ─► ignore (duplicate signal)
//!                   │ true
//!                   ▼
//!                 client script ─► bind __JWB_BRIDGE__ ─► queue NotifyReady
//!                   │ failure
//!                   ▼
//!                 BridgeState::revert()
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use rustc_hash::FxHashMap;
use tokio::runtime::Handle;
use tokio::sync::{oneshot, watch};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::bridge::{BRIDGE_OBJECT, Delivery, Dispatcher, READY_CALLBACK, RESPONSE_CALLBACK};
use crate::error::{Error, Result};
use crate::identifiers::SurfaceId;
use crate::services::Services;

use super::assets;
use super::builder::ShellBuilder;
use super::surface::{BridgeState, EntryPoint, Surface, SurfaceEvents, SurfaceFactory};
use super::ui_thread::{self, UiCommand, UiHandle};
use super::WindowOptions;

// ============================================================================
// Constants
// ============================================================================

/// Maximum wait for the UI thread to answer a query.
const REPLY_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// ShellConfig
// ============================================================================

/// Validated settings handed over by [`ShellBuilder`].
pub(crate) struct ShellConfig {
    pub entry_page: String,
    pub main_window: WindowOptions,
    pub factory: Arc<dyn SurfaceFactory>,
    pub services: Services,
    pub runtime: Handle,
}

// ============================================================================
// Shell
// ============================================================================

/// Shared shell state.
struct ShellInner {
    ui: UiHandle,
    main_window: SurfaceId,
    /// Number of open windows, published by the UI thread.
    open: watch::Receiver<usize>,
}

impl Drop for ShellInner {
    fn drop(&mut self) {
        let _ = self.ui.post(UiCommand::Shutdown(None));
    }
}

/// Running host shell.
///
/// Cloning is cheap. Dropping the last clone stops the UI thread.
#[derive(Clone)]
pub struct Shell {
    inner: Arc<ShellInner>,
}

impl fmt::Debug for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shell")
            .field("main_window", &self.inner.main_window)
            .field("open", &*self.inner.open.borrow())
            .finish()
    }
}

impl Shell {
    /// Creates a builder.
    #[inline]
    #[must_use]
    pub fn builder() -> ShellBuilder {
        ShellBuilder::new()
    }

    /// Starts the UI thread and opens the main window.
    pub(crate) async fn launch(
        ui: UiHandle,
        rx: tokio::sync::mpsc::UnboundedReceiver<UiCommand>,
        config: ShellConfig,
    ) -> Result<Self> {
        let ShellConfig {
            entry_page,
            main_window,
            factory,
            services,
            runtime,
        } = config;

        let (open_tx, open_rx) = watch::channel(0);
        let state_ui = ui.clone();

        ui_thread::spawn(rx, move || {
            let mut state = ShellState {
                ui: state_ui,
                factory,
                services,
                runtime,
                windows: FxHashMap::default(),
                open: open_tx,
            };
            move |command| state.handle(command)
        })?;

        let main_window = match Self::open_on(&ui, entry_page, main_window).await {
            Ok(id) => id,
            Err(e) => {
                let _ = ui.post(UiCommand::Shutdown(None));
                return Err(e);
            }
        };

        info!(surface = %main_window, "Shell started");

        Ok(Self {
            inner: Arc::new(ShellInner {
                ui,
                main_window,
                open: open_rx,
            }),
        })
    }

    /// Returns the main window.
    #[inline]
    #[must_use]
    pub fn main_window(&self) -> SurfaceId {
        self.inner.main_window
    }

    /// Opens a window showing a bundled page.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if `page` is not in the bundle
    /// - [`Error::ShellClosed`] if the shell has shut down
    /// - Backend errors from surface creation
    pub async fn open_window(
        &self,
        page: impl Into<String>,
        options: WindowOptions,
    ) -> Result<SurfaceId> {
        Self::open_on(&self.inner.ui, page.into(), options).await
    }

    /// Lists open windows in creation order.
    ///
    /// # Errors
    ///
    /// [`Error::ShellClosed`] if the shell has shut down.
    pub async fn windows(&self) -> Result<Vec<SurfaceId>> {
        request(&self.inner.ui, UiCommand::ListWindows).await
    }

    /// Returns the number of open windows.
    ///
    /// # Errors
    ///
    /// [`Error::ShellClosed`] if the shell has shut down.
    pub async fn window_count(&self) -> Result<usize> {
        Ok(self.windows().await?.len())
    }

    /// Closes one window. Responses still in flight for it are dropped.
    ///
    /// # Errors
    ///
    /// - [`Error::SurfaceNotFound`] if the window is not open
    /// - [`Error::ShellClosed`] if the shell has shut down
    pub async fn close_window(&self, id: SurfaceId) -> Result<()> {
        let closed = request(&self.inner.ui, |reply| UiCommand::CloseWindow {
            surface: id,
            reply: Some(reply),
        })
        .await?;

        if closed {
            Ok(())
        } else {
            Err(Error::surface_not_found(id))
        }
    }

    /// Resolves once no window is open.
    pub async fn wait_until_closed(&self) {
        let mut open = self.inner.open.clone();
        // An error means the UI thread is gone, which also means no windows.
        let _ = open.wait_for(|count| *count == 0).await;
    }

    /// Closes every window and stops the UI thread.
    ///
    /// Calling it again is a no-op.
    ///
    /// # Errors
    ///
    /// [`Error::Timeout`] if the UI thread does not acknowledge in time.
    pub async fn shutdown(&self) -> Result<()> {
        match request(&self.inner.ui, |reply| UiCommand::Shutdown(Some(reply))).await {
            Ok(()) => {
                info!("Shell shut down");
                Ok(())
            }
            Err(e) if e.is_shell_closed() => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Returns `true` once the UI thread has stopped.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.ui.is_closed()
    }

    async fn open_on(ui: &UiHandle, page: String, options: WindowOptions) -> Result<SurfaceId> {
        request(ui, |reply| UiCommand::OpenWindow {
            page,
            options,
            reply: Some(reply),
        })
        .await?
    }
}

/// Posts a command carrying a reply channel and waits for the answer.
async fn request<T>(
    ui: &UiHandle,
    command: impl FnOnce(oneshot::Sender<T>) -> UiCommand,
) -> Result<T> {
    let (reply_tx, reply_rx) = oneshot::channel();
    ui.post(command(reply_tx))?;

    let reply = timeout(REPLY_TIMEOUT, reply_rx)
        .await
        .map_err(|_| Error::timeout("UI thread reply", REPLY_TIMEOUT.as_millis() as u64))??;

    Ok(reply)
}

// ============================================================================
// SurfaceDelivery
// ============================================================================

/// Delivers Responses to one surface via the UI thread.
struct SurfaceDelivery {
    surface: SurfaceId,
    ui: UiHandle,
}

impl Delivery for SurfaceDelivery {
    fn deliver(&self, response: String) {
        let command = UiCommand::Deliver {
            surface: self.surface,
            response,
        };
        if self.ui.post(command).is_err() {
            warn!(surface = %self.surface, "Shell closed, response dropped");
        }
    }
}

/// Builds the native entry point for one surface.
fn entry_point(
    services: &Services,
    ui: &UiHandle,
    runtime: &Handle,
    surface: SurfaceId,
) -> EntryPoint {
    let delivery = Arc::new(SurfaceDelivery {
        surface,
        ui: ui.clone(),
    });
    let dispatcher = Dispatcher::new(services.clone(), delivery, runtime.clone());

    Arc::new(move |raw: String| dispatcher.post_message(&raw))
}

// ============================================================================
// ShellState
// ============================================================================

/// An open window.
struct Window {
    surface: Box<dyn Surface>,
    bridge: BridgeState,
    page: String,
}

/// State owned by the UI thread.
struct ShellState {
    ui: UiHandle,
    factory: Arc<dyn SurfaceFactory>,
    services: Services,
    runtime: Handle,
    windows: FxHashMap<SurfaceId, Window>,
    open: watch::Sender<usize>,
}

impl ShellState {
    fn handle(&mut self, command: UiCommand) -> ControlFlow<()> {
        match command {
            UiCommand::OpenWindow {
                page,
                options,
                reply,
            } => {
                let result = self.open_window(page, &options);
                if let Err(e) = &result {
                    error!(title = %options.title, error = %e, "Window creation failed");
                }
                if let Some(reply) = reply {
                    let _ = reply.send(result);
                }
            }

            UiCommand::PageLoaded(id) => self.install_bridge(id),

            UiCommand::NotifyReady(id) => self.notify_ready(id),

            UiCommand::ScriptError { surface, message } => {
                warn!(
                    surface = %surface,
                    page = self.page_of(surface),
                    text = %message,
                    "Page script error"
                );
            }

            UiCommand::Console { surface, message } => {
                info!(
                    surface = %surface,
                    page = self.page_of(surface),
                    text = %message,
                    "Page console"
                );
            }

            UiCommand::Deliver { surface, response } => self.deliver(surface, &response),

            UiCommand::CloseWindow { surface, reply } => {
                let closed = self.close_window(surface);
                if let Some(reply) = reply {
                    let _ = reply.send(closed);
                }
            }

            UiCommand::ListWindows(reply) => {
                let mut ids: Vec<_> = self.windows.keys().copied().collect();
                ids.sort_unstable();
                let _ = reply.send(ids);
            }

            UiCommand::Shutdown(reply) => {
                self.close_all();
                if let Some(reply) = reply {
                    let _ = reply.send(());
                }
                return ControlFlow::Break(());
            }
        }

        ControlFlow::Continue(())
    }

    fn open_window(&mut self, page: String, options: &WindowOptions) -> Result<SurfaceId> {
        let url = self.services.resources.resource_url(&page)?;
        let id = SurfaceId::next();

        let events = SurfaceEvents::new(id, self.ui.clone());
        let mut surface = self.factory.create(id, options, events)?;

        if let Err(e) = surface
            .set_title(&options.title)
            .and_then(|()| surface.load_url(&url))
        {
            surface.close();
            return Err(e);
        }

        info!(surface = %id, %page, width = options.width, height = options.height, "Window opened");

        self.windows.insert(
            id,
            Window {
                surface,
                bridge: BridgeState::default(),
                page,
            },
        );
        self.publish_count();

        Ok(id)
    }

    fn install_bridge(&mut self, id: SurfaceId) {
        let Some(window) = self.windows.get_mut(&id) else {
            debug!(surface = %id, "Load signal for unknown surface");
            return;
        };

        if !window.bridge.install() {
            debug!(surface = %id, "Bridge already installed, load signal ignored");
            return;
        }

        let entry = entry_point(&self.services, &self.ui, &self.runtime, id);
        let installed = window
            .surface
            .execute_script(&assets::client_script())
            .and_then(|()| window.surface.bind_entry_point(BRIDGE_OBJECT, entry));

        match installed {
            Ok(()) => {
                info!(surface = %id, page = %window.page, "Bridge installed");
                if self.ui.post(UiCommand::NotifyReady(id)).is_err() {
                    warn!(surface = %id, "Shell closed before ready notification");
                }
            }
            Err(e) => {
                window.bridge.revert();
                error!(surface = %id, error = %e, "Bridge installation failed");
            }
        }
    }

    fn notify_ready(&mut self, id: SurfaceId) {
        let Some(window) = self.windows.get_mut(&id) else {
            debug!(surface = %id, "Ready notification for closed surface dropped");
            return;
        };

        if let Err(e) = window.surface.call_function(READY_CALLBACK, None) {
            warn!(surface = %id, error = %e, "Ready notification failed");
        }
    }

    fn deliver(&mut self, id: SurfaceId, response: &str) {
        let Some(window) = self.windows.get_mut(&id) else {
            debug!(surface = %id, "Response for closed surface dropped");
            return;
        };

        if let Err(e) = window.surface.call_function(RESPONSE_CALLBACK, Some(response)) {
            warn!(surface = %id, error = %e, "Response delivery failed");
        }
    }

    fn close_window(&mut self, id: SurfaceId) -> bool {
        let Some(mut window) = self.windows.remove(&id) else {
            return false;
        };

        window.surface.close();
        self.publish_count();
        info!(surface = %id, remaining = self.windows.len(), "Window closed");
        true
    }

    fn close_all(&mut self) {
        for (_, mut window) in self.windows.drain() {
            window.surface.close();
        }
        self.publish_count();
    }

    /// Returns the page shown by a surface, or `"-"` once it has closed.
    fn page_of(&self, id: SurfaceId) -> &str {
        self.windows.get(&id).map_or("-", |window| window.page.as_str())
    }

    fn publish_count(&self) {
        self.open.send_replace(self.windows.len());
    }
}

// ============================================================================
// Tests
// ============================================================================
