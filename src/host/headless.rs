//! Headless surface backend.
//!
//! [`HeadlessFactory`] creates surfaces that render nothing but record what
//! the shell does to them. Each surface comes with a [`SurfaceProbe`] that
//! plays the page's part: posting request text to the bound entry point,
//! signalling page loads and closes, and observing callbacks.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use webview_bridge::{HeadlessFactory, Result, Shell};
//!
//! # async fn example() -> Result<()> {
//! let factory = HeadlessFactory::new();
//! let shell = Shell::builder()
//!     .resource_root("web/public")
//!     .surface_factory(factory.clone())
//!     .build()
//!     .await?;
//!
//! let probe = factory.probe(shell.main_window()).expect("main window");
//! probe.wait_until_ready(Duration::from_secs(5)).await?;
//! probe.post_message(r#"{"protocol":"1.0","id":"1","type":"INIT_APP","payload":null}"#)?;
//!
//! let responses = probe.wait_for_responses(1, Duration::from_secs(5)).await?;
//! println!("{}", responses[0].get_string("appName"));
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tokio::sync::watch;
use tokio::time::timeout;
use tracing::{debug, trace};
use url::Url;

use crate::bridge::{BRIDGE_OBJECT, READY_CALLBACK, RESPONSE_CALLBACK};
use crate::error::{Error, Result};
use crate::identifiers::SurfaceId;
use crate::protocol::Response;

use super::WindowOptions;
use super::surface::{EntryPoint, Surface, SurfaceEvents, SurfaceFactory};

// ============================================================================
// HeadlessFactory
// ============================================================================

/// Factory state shared between clones.
struct FactoryInner {
    /// Whether surfaces signal page load as soon as a URL is loaded.
    auto_load: bool,
    /// Probes in creation order.
    probes: Mutex<Vec<SurfaceProbe>>,
    /// Number of surfaces created so far.
    created: watch::Sender<usize>,
}

/// [`SurfaceFactory`] producing in-memory surfaces.
///
/// Clones share the same set of probes.
#[derive(Clone)]
pub struct HeadlessFactory {
    inner: Arc<FactoryInner>,
}

impl HeadlessFactory {
    /// Creates a factory whose surfaces report page load right after
    /// navigation.
    #[must_use]
    pub fn new() -> Self {
        Self::with_auto_load(true)
    }

    /// Creates a factory whose surfaces never report page load on their
    /// own; use [`SurfaceProbe::fire_page_loaded`].
    #[must_use]
    pub fn manual_load() -> Self {
        Self::with_auto_load(false)
    }

    fn with_auto_load(auto_load: bool) -> Self {
        let (created, _) = watch::channel(0);
        Self {
            inner: Arc::new(FactoryInner {
                auto_load,
                probes: Mutex::new(Vec::new()),
                created,
            }),
        }
    }

    /// Returns probes for every surface created so far.
    #[must_use]
    pub fn probes(&self) -> Vec<SurfaceProbe> {
        self.inner.probes.lock().clone()
    }

    /// Returns the probe of one surface.
    #[must_use]
    pub fn probe(&self, id: SurfaceId) -> Option<SurfaceProbe> {
        self.inner
            .probes
            .lock()
            .iter()
            .find(|probe| probe.id() == id)
            .cloned()
    }

    /// Waits until at least `count` surfaces exist and returns their probes.
    ///
    /// # Errors
    ///
    /// [`Error::Timeout`] if fewer surfaces exist after `wait`.
    pub async fn wait_for_surfaces(&self, count: usize, wait: Duration) -> Result<Vec<SurfaceProbe>> {
        let mut created = self.inner.created.subscribe();

        timeout(wait, created.wait_for(|n| *n >= count))
            .await
            .map_err(|_| Error::timeout(format!("{count} surfaces"), wait.as_millis() as u64))?
            .map_err(|_| Error::internal("surface counter dropped"))?;

        Ok(self.probes())
    }
}

impl Default for HeadlessFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HeadlessFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessFactory")
            .field("auto_load", &self.inner.auto_load)
            .field("surfaces", &self.inner.probes.lock().len())
            .finish()
    }
}

impl SurfaceFactory for HeadlessFactory {
    fn create(
        &self,
        id: SurfaceId,
        options: &WindowOptions,
        events: SurfaceEvents,
    ) -> Result<Box<dyn Surface>> {
        let probe = SurfaceProbe::new(id, options.clone(), events);

        self.inner.probes.lock().push(probe.clone());
        self.inner.created.send_modify(|n| *n += 1);

        debug!(surface = %id, title = %options.title, "Headless surface created");

        Ok(Box::new(HeadlessSurface {
            probe,
            auto_load: self.inner.auto_load,
        }))
    }
}

// ============================================================================
// FunctionCall
// ============================================================================

/// One `call_function` invocation observed on a surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCall {
    /// Page function name.
    pub name: String,
    /// JSON argument, if any.
    pub argument: Option<String>,
    /// Name of the thread that made the call.
    pub thread: Option<String>,
}

// ============================================================================
// SurfaceProbe
// ============================================================================

/// Everything observed on one headless surface.
#[derive(Default)]
struct SurfaceRecord {
    url: Option<Url>,
    title: String,
    scripts: Vec<String>,
    entry_points: FxHashMap<String, EntryPoint>,
    bind_count: usize,
    calls: Vec<FunctionCall>,
    closed: bool,
}

/// Probe state shared between the surface and its observers.
struct ProbeState {
    id: SurfaceId,
    options: WindowOptions,
    events: SurfaceEvents,
    record: Mutex<SurfaceRecord>,
    /// Bumped after every change to `record`.
    version: watch::Sender<u64>,
}

/// Test-side view of a headless surface.
///
/// Cheap to clone and safe to use from any thread.
#[derive(Clone)]
pub struct SurfaceProbe {
    state: Arc<ProbeState>,
}

impl fmt::Debug for SurfaceProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceProbe")
            .field("id", &self.state.id)
            .field("options", &self.state.options)
            .finish_non_exhaustive()
    }
}

impl SurfaceProbe {
    fn new(id: SurfaceId, options: WindowOptions, events: SurfaceEvents) -> Self {
        let (version, _) = watch::channel(0);
        let record = SurfaceRecord {
            title: options.title.clone(),
            ..SurfaceRecord::default()
        };

        Self {
            state: Arc::new(ProbeState {
                id,
                options,
                events,
                record: Mutex::new(record),
                version,
            }),
        }
    }

    /// Applies a change to the record and wakes waiters.
    fn update<T>(&self, change: impl FnOnce(&mut SurfaceRecord) -> T) -> T {
        let out = change(&mut self.state.record.lock());
        self.state.version.send_modify(|v| *v += 1);
        out
    }

    /// Returns the surface id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> SurfaceId {
        self.state.id
    }

    /// Returns the options the surface was created with.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &WindowOptions {
        &self.state.options
    }

    /// Returns the last loaded URL.
    #[must_use]
    pub fn url(&self) -> Option<Url> {
        self.state.record.lock().url.clone()
    }

    /// Returns the current title.
    #[must_use]
    pub fn title(&self) -> String {
        self.state.record.lock().title.clone()
    }

    /// Returns every evaluated script, oldest first.
    #[must_use]
    pub fn scripts(&self) -> Vec<String> {
        self.state.record.lock().scripts.clone()
    }

    /// Returns how many times an entry point was bound.
    #[must_use]
    pub fn bind_count(&self) -> usize {
        self.state.record.lock().bind_count
    }

    /// Returns `true` if the bridge entry point is bound.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.state.record.lock().entry_points.contains_key(BRIDGE_OBJECT)
    }

    /// Returns `true` once the shell closed the surface.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.record.lock().closed
    }

    /// Returns every `call_function` invocation, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<FunctionCall> {
        self.state.record.lock().calls.clone()
    }

    /// Returns how many ready notifications the page received.
    #[must_use]
    pub fn ready_count(&self) -> usize {
        self.calls_to(READY_CALLBACK).count()
    }

    /// Returns every Response delivered to the page, oldest first.
    #[must_use]
    pub fn responses(&self) -> Vec<Response> {
        self.calls_to(RESPONSE_CALLBACK)
            .filter_map(|call| call.argument)
            .filter_map(|text| Response::decode(&text).ok())
            .collect()
    }

    fn calls_to(&self, name: &'static str) -> impl Iterator<Item = FunctionCall> {
        self.calls().into_iter().filter(move |call| call.name == name)
    }

    /// Calls the bridge entry point as the page would.
    ///
    /// Runs on the calling thread.
    ///
    /// # Errors
    ///
    /// [`Error::Script`] if the bridge is not bound.
    pub fn post_message(&self, raw: impl Into<String>) -> Result<()> {
        let entry = self
            .state
            .record
            .lock()
            .entry_points
            .get(BRIDGE_OBJECT)
            .cloned()
            .ok_or_else(|| Error::script(format!("{BRIDGE_OBJECT} is not defined")))?;

        entry(raw.into());
        Ok(())
    }

    /// Signals that the page finished loading.
    pub fn fire_page_loaded(&self) {
        self.state.events.page_loaded();
    }

    /// Reports an uncaught script error as the page would.
    pub fn fire_script_error(&self, message: impl Into<String>) {
        self.state.events.script_error(message);
    }

    /// Reports console output as the page would.
    pub fn fire_console(&self, message: impl Into<String>) {
        self.state.events.console(message);
    }

    /// Closes the surface as a user would.
    pub fn close(&self) {
        self.state.events.closed();
    }

    /// Waits until `condition` holds for this probe.
    ///
    /// # Errors
    ///
    /// [`Error::Timeout`] if it does not hold after `wait`.
    pub async fn wait_until(
        &self,
        wait: Duration,
        condition: impl Fn(&SurfaceProbe) -> bool,
    ) -> Result<()> {
        let mut version = self.state.version.subscribe();

        timeout(wait, version.wait_for(|_| condition(self)))
            .await
            .map_err(|_| {
                Error::timeout(
                    format!("surface {} condition", self.id()),
                    wait.as_millis() as u64,
                )
            })?
            .map_err(|_| Error::internal("probe version dropped"))?;

        Ok(())
    }

    /// Waits for the first ready notification.
    ///
    /// # Errors
    ///
    /// [`Error::Timeout`] if none arrives within `wait`.
    pub async fn wait_until_ready(&self, wait: Duration) -> Result<()> {
        self.wait_until(wait, |probe| probe.ready_count() > 0).await
    }

    /// Waits until at least `count` Responses were delivered.
    ///
    /// # Errors
    ///
    /// [`Error::Timeout`] if fewer arrive within `wait`.
    pub async fn wait_for_responses(&self, count: usize, wait: Duration) -> Result<Vec<Response>> {
        self.wait_until(wait, |probe| probe.responses().len() >= count)
            .await?;
        Ok(self.responses())
    }
}

// ============================================================================
// HeadlessSurface
// ============================================================================

/// [`Surface`] that records into its [`SurfaceProbe`].
struct HeadlessSurface {
    probe: SurfaceProbe,
    auto_load: bool,
}

impl HeadlessSurface {
    fn ensure_open(&self) -> Result<()> {
        if self.probe.is_closed() {
            return Err(Error::script(format!("surface {} is closed", self.probe.id())));
        }
        Ok(())
    }
}

impl Surface for HeadlessSurface {
    fn load_url(&mut self, url: &Url) -> Result<()> {
        self.ensure_open()?;
        trace!(surface = %self.probe.id(), %url, "Headless navigation");
        self.probe.update(|record| record.url = Some(url.clone()));

        if self.auto_load {
            self.probe.fire_page_loaded();
        }
        Ok(())
    }

    fn set_title(&mut self, title: &str) -> Result<()> {
        self.ensure_open()?;
        self.probe.update(|record| record.title = title.to_string());
        Ok(())
    }

    fn execute_script(&mut self, script: &str) -> Result<()> {
        self.ensure_open()?;
        self.probe.update(|record| record.scripts.push(script.to_string()));
        Ok(())
    }

    fn bind_entry_point(&mut self, name: &str, entry: EntryPoint) -> Result<()> {
        self.ensure_open()?;
        self.probe.update(|record| {
            record.entry_points.insert(name.to_string(), entry);
            record.bind_count += 1;
        });
        Ok(())
    }

    fn call_function(&mut self, name: &str, argument: Option<&str>) -> Result<()> {
        self.ensure_open()?;
        let call = FunctionCall {
            name: name.to_string(),
            argument: argument.map(str::to_string),
            thread: thread::current().name().map(str::to_string),
        };
        self.probe.update(|record| record.calls.push(call));
        Ok(())
    }

    fn close(&mut self) {
        self.probe.update(|record| {
            record.closed = true;
            record.entry_points.clear();
        });
    }
}

// ============================================================================
// Tests
// ============================================================================
