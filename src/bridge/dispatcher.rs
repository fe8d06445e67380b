//! Request dispatcher.
//!
//! One dispatcher serves one UI surface. It decodes raw request text,
//! routes by operation to the injected services, decides where each
//! operation runs, shapes every failure into an `ERROR` Response and hands
//! the encoded Response to its [`Delivery`].
//!
//! # Placement
//!
//! | Operation | Runs on |
//! |-----------|---------|
//! | `INIT_APP` | caller thread |
//! | `SPAWN_WINDOW` | caller thread (window creation is deferred to the UI thread) |
//! | `READ_FILE` | blocking pool |
//! | `LOAD_HTML` | blocking pool |
//!
//! Nothing escapes [`Dispatcher::post_message`]: decode errors, service
//! errors, panics and encoding failures all become Responses.

// ============================================================================
// Imports
// ============================================================================

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::runtime::Handle;
use tracing::{debug, error, trace, warn};

use crate::error::{Error, Result};
use crate::identifiers::CorrelationId;
use crate::protocol::{ErrorPayload, Operation, Request, Response};
use crate::services::Services;

use super::Delivery;

// ============================================================================
// Types
// ============================================================================

/// Unit of work producing a Response payload.
type Job = Box<dyn FnOnce() -> Result<Value> + Send + 'static>;

// ============================================================================
// Placement
// ============================================================================

/// Where an operation executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// On the thread that called `post_message`.
    Inline,
    /// On tokio's blocking pool.
    Background,
}

impl Placement {
    /// Returns the placement for `operation`.
    #[must_use]
    pub const fn of(operation: Operation) -> Self {
        match operation {
            Operation::ReadFile | Operation::LoadHtml => Self::Background,
            _ => Self::Inline,
        }
    }
}

// ============================================================================
// Dispatcher
// ============================================================================

/// Shared dispatcher state.
struct DispatcherInner {
    /// Injected capability services.
    services: Services,
    /// Where encoded Responses go.
    delivery: Arc<dyn Delivery>,
    /// Runtime owning the blocking pool.
    runtime: Handle,
}

/// Bridge dispatcher bound to one delivery target.
///
/// Cloning is cheap and shares the same services and delivery.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher").finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Creates a dispatcher.
    ///
    /// # Arguments
    ///
    /// * `services` - Handlers for each operation family
    /// * `delivery` - Receives every encoded Response
    /// * `runtime` - Runtime whose blocking pool runs offloaded operations
    #[must_use]
    pub fn new(services: Services, delivery: Arc<dyn Delivery>, runtime: Handle) -> Self {
        Self {
            inner: Arc::new(DispatcherInner {
                services,
                delivery,
                runtime,
            }),
        }
    }

    /// Submits one serialized Request.
    ///
    /// Returns immediately for offloaded operations. Exactly one Response
    /// is delivered per call, later or (for inline operations) before
    /// returning.
    pub fn post_message(&self, raw: &str) {
        trace!(raw, "Bridge message received");

        let request = match Request::decode(raw) {
            Ok(request) => request,
            Err(e) => {
                let id = match &e {
                    Error::Decode { id: Some(id), .. } => id.clone(),
                    _ => CorrelationId::global(),
                };
                self.inner.complete(&id, None, Err(e));
                return;
            }
        };

        debug!(
            id = %request.id,
            operation = %request.operation,
            protocol = %request.protocol,
            "Request decoded"
        );

        self.route(request);
    }

    /// Routes a decoded request to its service.
    fn route(&self, request: Request) {
        let Request {
            id,
            operation,
            payload,
            ..
        } = request;
        let services = &self.inner.services;

        let job: Job = match operation {
            Operation::InitApp => {
                let app = Arc::clone(&services.app);
                Box::new(move || to_payload(app.init_data()?))
            }
            Operation::ReadFile => {
                let files = Arc::clone(&services.files);
                Box::new(move || to_payload(files.read_file(&payload)?))
            }
            Operation::SpawnWindow => {
                let windows = Arc::clone(&services.windows);
                Box::new(move || to_payload(windows.spawn_window(&payload)?))
            }
            Operation::LoadHtml => {
                let resources = Arc::clone(&services.resources);
                Box::new(move || to_payload(resources.load_html(&payload)?))
            }
            Operation::GetAppInfo | Operation::WriteFile | Operation::ListDirectory => {
                self.inner
                    .complete(&id, Some(operation), Err(Error::not_implemented(operation)));
                return;
            }
        };

        match Placement::of(operation) {
            Placement::Inline => {
                trace!(id = %id, %operation, "Executing inline");
                let outcome = run_guarded(job);
                self.inner.complete(&id, Some(operation), outcome);
            }
            Placement::Background => {
                trace!(id = %id, %operation, "Executing on blocking pool");
                let pending = PendingResponse {
                    inner: Arc::clone(&self.inner),
                    id,
                    operation,
                    answered: false,
                };
                // The handle is not awaited; the closure delivers its own Response.
                drop(self.inner.runtime.spawn_blocking(move || {
                    pending.answer(run_guarded(job));
                }));
            }
        }
    }
}

impl DispatcherInner {
    /// Builds, encodes and delivers the Response for one request.
    fn complete(&self, id: &CorrelationId, operation: Option<Operation>, outcome: Result<Value>) {
        let response = match outcome {
            Ok(payload) => {
                debug!(id = %id, ?operation, "Request succeeded");
                Response::success(id.clone(), payload)
            }
            Err(e) => {
                let payload = ErrorPayload::from_error(&e, operation);
                if e.is_client_error() {
                    warn!(id = %id, ?operation, code = %payload.code, error = %e, "Request rejected");
                } else {
                    error!(id = %id, ?operation, code = %payload.code, error = %e, "Request failed");
                }
                Response::error(id.clone(), payload)
            }
        };

        self.delivery.deliver(encode_response(&response));
    }
}

// ============================================================================
// PendingResponse
// ============================================================================

/// Response owed by an offloaded job.
///
/// A blocking task cancelled before it runs (the runtime shut down) drops
/// its closure; the drop still answers the request.
struct PendingResponse {
    inner: Arc<DispatcherInner>,
    id: CorrelationId,
    operation: Operation,
    answered: bool,
}

impl PendingResponse {
    fn answer(mut self, outcome: Result<Value>) {
        self.answered = true;
        self.inner.complete(&self.id, Some(self.operation), outcome);
    }
}

impl Drop for PendingResponse {
    fn drop(&mut self) {
        if self.answered {
            return;
        }

        error!(
            id = %self.id,
            operation = %self.operation,
            "Blocking task cancelled before running"
        );
        self.inner.complete(
            &self.id,
            Some(self.operation),
            Err(Error::internal("runtime shut down before the request ran")),
        );
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Converts a service result into a Response payload.
fn to_payload<T: Serialize>(value: T) -> Result<Value> {
    serde_json::to_value(value).map_err(Error::Encode)
}

/// Encodes a Response, degrading to a minimal `ERROR` text on failure.
///
/// Payloads are already `Value`s, which always serialize, so the fallback
/// only guards the one-Response-per-request rule. Service results that do
/// not serialize fail earlier in [`to_payload`] and arrive here as an
/// ordinary `ERROR` Response.
fn encode_response(response: &Response) -> String {
    response.encode().unwrap_or_else(|e| {
        error!(id = %response.id, error = %e, "Response encoding failed");
        Response::encoding_failure(&response.id, &e)
    })
}

/// Runs a job, turning a panic into [`Error::Internal`].
fn run_guarded(job: Job) -> Result<Value> {
    panic::catch_unwind(AssertUnwindSafe(job)).unwrap_or_else(|panic| {
        Err(Error::internal(format!(
            "handler panicked: {}",
            panic_message(panic.as_ref())
        )))
    })
}

/// Extracts the message of a panic payload.
fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

// ============================================================================
// Tests
// ============================================================================
