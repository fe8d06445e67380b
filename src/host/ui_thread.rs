//! The UI-affecting thread.
//!
//! Surfaces are created, mutated and scripted only on this thread. Other
//! threads reach it by posting [`UiCommand`]s through a [`UiHandle`]; the
//! thread drains them in order with `blocking_recv`.
//!
//! ```text
//! dispatcher / blocking pool ──┐
//! Shell API ───────────────────┼──► UiHandle ──► mpsc ──► "jwb-ui" thread ──► Surface
//! SurfaceEvents ───────────────┘
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::ops::ControlFlow;
use std::thread::{self, JoinHandle};

use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::error::{Error, Result};
use crate::identifiers::SurfaceId;

use super::WindowOptions;

// ============================================================================
// Constants
// ============================================================================

/// Name of the UI thread.
pub const UI_THREAD_NAME: &str = "jwb-ui";

// ============================================================================
// UiCommand
// ============================================================================

/// Work item executed on the UI thread.
pub(crate) enum UiCommand {
    /// Create a surface and load a bundled page into it.
    OpenWindow {
        page: String,
        options: WindowOptions,
        reply: Option<oneshot::Sender<Result<SurfaceId>>>,
    },
    /// A surface finished loading its content.
    PageLoaded(SurfaceId),
    /// Tell the UI side that native calls are safe.
    NotifyReady(SurfaceId),
    /// Uncaught script error reported by the page.
    ScriptError {
        surface: SurfaceId,
        message: String,
    },
    /// Console or alert output from the page.
    Console {
        surface: SurfaceId,
        message: String,
    },
    /// Push an encoded Response into a surface.
    Deliver {
        surface: SurfaceId,
        response: String,
    },
    /// Remove a surface. Replies `false` if it did not exist.
    CloseWindow {
        surface: SurfaceId,
        reply: Option<oneshot::Sender<bool>>,
    },
    /// List open surfaces.
    ListWindows(oneshot::Sender<Vec<SurfaceId>>),
    /// Close everything and stop the loop.
    Shutdown(Option<oneshot::Sender<()>>),
}

impl fmt::Debug for UiCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenWindow { page, .. } => {
                f.debug_struct("OpenWindow").field("page", page).finish()
            }
            Self::PageLoaded(id) => f.debug_tuple("PageLoaded").field(id).finish(),
            Self::NotifyReady(id) => f.debug_tuple("NotifyReady").field(id).finish(),
            Self::ScriptError { surface, message } => f
                .debug_struct("ScriptError")
                .field("surface", surface)
                .field("message", message)
                .finish(),
            Self::Console { surface, message } => f
                .debug_struct("Console")
                .field("surface", surface)
                .field("message", message)
                .finish(),
            Self::Deliver { surface, .. } => {
                f.debug_struct("Deliver").field("surface", surface).finish()
            }
            Self::CloseWindow { surface, .. } => {
                f.debug_struct("CloseWindow").field("surface", surface).finish()
            }
            Self::ListWindows(_) => f.write_str("ListWindows"),
            Self::Shutdown(_) => f.write_str("Shutdown"),
        }
    }
}

// ============================================================================
// UiHandle
// ============================================================================

/// Thread-safe handle for posting work to the UI thread.
#[derive(Debug, Clone)]
pub(crate) struct UiHandle {
    tx: mpsc::UnboundedSender<UiCommand>,
}

impl UiHandle {
    /// Creates a handle and the receiving end of its queue.
    pub(crate) fn channel() -> (Self, mpsc::UnboundedReceiver<UiCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Queues a command without waiting.
    ///
    /// # Errors
    ///
    /// [`Error::ShellClosed`] if the UI thread has exited.
    pub(crate) fn post(&self, command: UiCommand) -> Result<()> {
        self.tx.send(command).map_err(|_| Error::ShellClosed)
    }

    /// Returns `true` once the UI thread has stopped.
    #[inline]
    #[must_use]
    pub(crate) fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

// ============================================================================
// Loop
// ============================================================================

/// Starts the UI thread.
///
/// `init` runs on the new thread and builds the command handler there, so
/// the handler may own values that never leave the thread. The loop stops
/// when the handler breaks or every [`UiHandle`] is dropped.
pub(crate) fn spawn<I, H>(
    mut rx: mpsc::UnboundedReceiver<UiCommand>,
    init: I,
) -> Result<JoinHandle<()>>
where
    I: FnOnce() -> H + Send + 'static,
    H: FnMut(UiCommand) -> ControlFlow<()>,
{
    thread::Builder::new()
        .name(UI_THREAD_NAME.to_string())
        .spawn(move || {
            let mut handler = init();
            debug!("UI loop started");

            while let Some(command) = rx.blocking_recv() {
                if handler(command).is_break() {
                    break;
                }
            }

            debug!("UI loop terminated");
        })
        .map_err(|e| Error::internal(format!("failed to start UI thread: {e}")))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::mpsc as std_mpsc;

    #[test]
    fn test_commands_run_in_order_on_named_thread() {
        let (ui, rx) = UiHandle::channel();
        let (seen_tx, seen_rx) = std_mpsc::channel();

        let join = spawn(rx, move || {
            move |command: UiCommand| {
                let thread = thread::current().name().map(str::to_string);
                match command {
                    UiCommand::PageLoaded(id) => {
                        let _ = seen_tx.send((id.as_u32(), thread));
                        ControlFlow::Continue(())
                    }
                    _ => ControlFlow::Break(()),
                }
            }
        })
        .expect("spawn");

        for n in 1..=3 {
            let id = SurfaceId::new(n).expect("non-zero");
            ui.post(UiCommand::PageLoaded(id)).expect("post");
        }
        ui.post(UiCommand::Shutdown(None)).expect("post");
        join.join().expect("join");

        let seen: Vec<_> = seen_rx.try_iter().collect();
        assert_eq!(seen.len(), 3);
        assert_eq!(
            seen.iter().map(|(id, _)| *id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert!(seen.iter().all(|(_, name)| name.as_deref() == Some(UI_THREAD_NAME)));
    }

    #[test]
    fn test_post_after_exit_is_shell_closed() {
        let (ui, rx) = UiHandle::channel();
        let join = spawn(rx, || |_: UiCommand| ControlFlow::Break(())).expect("spawn");

        ui.post(UiCommand::Shutdown(None)).expect("post");
        join.join().expect("join");

        assert!(ui.is_closed());
        let err = ui
            .post(UiCommand::ListWindows(oneshot::channel().0))
            .expect_err("should fail");
        assert!(err.is_shell_closed());
    }
}
