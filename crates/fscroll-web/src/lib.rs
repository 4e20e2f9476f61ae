#![forbid(unsafe_code)]

//! `fscroll-web` embeds the FrankenScroll engine in a host-driven page.
//!
//! Design goals:
//! - **Host-driven I/O**: the embedding environment (JS) pushes scroll input,
//!   viewport sizes, and content-ready notifications into a queue.
//! - **Deterministic time**: the host advances a monotonic clock explicitly;
//!   one [`WebScrollHost::advance`] call is one animation frame.
//! - **Synchronous navigation**: [`WebScrollHost::navigate`] tears the old
//!   page's engine down before the next page's setup runs.
//!
//! A frame is requested against the engine's [`ClockHandle`], the way a
//! browser host requests an animation frame. A frame that was requested for
//! an engine that has since been torn down is dropped when it fires.
//!
//! ```
//! use std::rc::Rc;
//! use std::time::Duration;
//!
//! use fscroll_core::geometry::ViewportRect;
//! use fscroll_core::input::InputEvent;
//! use fscroll_core::track::{LayoutSnapshot, SyntheticLayout, TrackId, TrackLayout};
//! use fscroll_runtime::EngineConfig;
//! use fscroll_web::{HostEvent, WebScrollHost};
//!
//! let viewport = ViewportRect::from_size(1000.0, 800.0);
//! let page = Rc::new(SyntheticLayout::new(LayoutSnapshot {
//!     viewport,
//!     document_extent: 3000.0,
//!     tracks: vec![TrackLayout::horizontal(TrackId(0), 0.0, vec![1000.0; 3])],
//! }));
//!
//! let mut host = WebScrollHost::new(EngineConfig::default(), viewport);
//! host.mount(page).unwrap();
//! host.events_mut().push_event(HostEvent::ContentReady(true));
//! host.events_mut().push_event(HostEvent::Input(InputEvent::wheel(0.0, 250.0)));
//! for _ in 0..120 {
//!     host.advance(Duration::from_millis(16));
//! }
//! assert_eq!(host.lifecycle().position(), Some(250.0));
//! ```

#[cfg(feature = "input-parser")]
pub mod input_parser;

use core::time::Duration;
use std::collections::VecDeque;
use std::rc::Rc;

use fscroll_core::geometry::ViewportRect;
use fscroll_core::input::InputEvent;
use fscroll_core::track::LayoutProvider;
use fscroll_runtime::{ClockHandle, EngineConfig, EngineError, ScrollLifecycle, SetupOutcome};

/// Web host error type.
#[derive(Debug, Clone, PartialEq)]
pub enum WebHostError {
    /// The engine refused the request.
    Engine(EngineError),
    /// No page is mounted.
    NoPage,
}

impl core::fmt::Display for WebHostError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Engine(err) => write!(f, "engine: {err}"),
            Self::NoPage => write!(f, "no page mounted"),
        }
    }
}

impl std::error::Error for WebHostError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Engine(err) => Some(err),
            Self::NoPage => None,
        }
    }
}

impl From<EngineError> for WebHostError {
    fn from(err: EngineError) -> Self {
        Self::Engine(err)
    }
}

/// Deterministic monotonic clock controlled by the host.
#[derive(Debug, Default, Clone)]
pub struct DeterministicClock {
    now: Duration,
}

impl DeterministicClock {
    /// Create a clock starting at `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
        }
    }

    /// Set current monotonic time.
    pub fn set(&mut self, now: Duration) {
        self.now = now;
    }

    /// Advance monotonic time by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }

    /// Current monotonic time.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Current time in fractional milliseconds, the unit of frame timestamps.
    #[must_use]
    pub fn now_ms(&self) -> f64 {
        self.now.as_secs_f64() * 1000.0
    }
}

/// Something the host reports between frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    /// Wheel, trackpad, or touch input.
    Input(InputEvent),
    /// The viewport changed size.
    Resize(ViewportRect),
    /// Fonts and images have (or have not) settled.
    ContentReady(bool),
    /// Content size changed without a viewport resize.
    ContentChanged,
}

/// Host-driven event queue.
#[derive(Debug, Clone)]
pub struct WebEventSource {
    viewport: ViewportRect,
    queue: VecDeque<HostEvent>,
}

impl WebEventSource {
    /// Create a new event source with an initial viewport.
    #[must_use]
    pub fn new(viewport: ViewportRect) -> Self {
        Self {
            viewport,
            queue: VecDeque::new(),
        }
    }

    /// Latest viewport reported by the host.
    #[must_use]
    pub const fn viewport(&self) -> ViewportRect {
        self.viewport
    }

    /// Push an event into the queue.
    pub fn push_event(&mut self, event: HostEvent) {
        if let HostEvent::Resize(viewport) = event {
            self.viewport = viewport;
        }
        self.queue.push_back(event);
    }

    /// Drain all pending events.
    pub fn drain_events(&mut self) -> impl Iterator<Item = HostEvent> + '_ {
        self.queue.drain(..)
    }

    /// Number of queued events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// What one [`WebScrollHost::advance`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameReport {
    /// Host events applied before the frame.
    pub events: usize,
    /// Input events the engine did not take; the host scrolls them natively.
    pub passthrough: usize,
    /// The engine ran a frame.
    pub ran: bool,
    /// The requested frame belonged to a torn-down engine and was dropped.
    pub stale: bool,
    /// Virtual position after the frame.
    pub position: Option<f64>,
}

/// A page host: event queue, clock, and the lifecycle of the mounted page.
pub struct WebScrollHost {
    clock: DeterministicClock,
    events: WebEventSource,
    lifecycle: ScrollLifecycle,
    page: Option<Rc<dyn LayoutProvider>>,
    requested: Option<ClockHandle>,
    stale_frames: u64,
    last_setup_error: Option<EngineError>,
}

impl core::fmt::Debug for WebScrollHost {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WebScrollHost")
            .field("clock", &self.clock)
            .field("queued", &self.events.len())
            .field("lifecycle", &self.lifecycle)
            .field("page", &self.page.is_some())
            .field("stale_frames", &self.stale_frames)
            .finish()
    }
}

impl WebScrollHost {
    /// Create a host with no page mounted.
    #[must_use]
    pub fn new(config: EngineConfig, viewport: ViewportRect) -> Self {
        Self {
            clock: DeterministicClock::new(),
            events: WebEventSource::new(viewport),
            lifecycle: ScrollLifecycle::new(config),
            page: None,
            requested: None,
            stale_frames: 0,
            last_setup_error: None,
        }
    }

    /// Mutably access the clock.
    pub fn clock_mut(&mut self) -> &mut DeterministicClock {
        &mut self.clock
    }

    /// Mutably access the event queue.
    pub fn events_mut(&mut self) -> &mut WebEventSource {
        &mut self.events
    }

    /// The page lifecycle.
    #[must_use]
    pub fn lifecycle(&self) -> &ScrollLifecycle {
        &self.lifecycle
    }

    /// The page lifecycle, for registering bindings and navigating in-page.
    pub fn lifecycle_mut(&mut self) -> &mut ScrollLifecycle {
        &mut self.lifecycle
    }

    /// Frames dropped because they were requested for a torn-down engine.
    #[must_use]
    pub fn stale_frames(&self) -> u64 {
        self.stale_frames
    }

    /// Most recent setup failure, cleared once a setup starts.
    #[must_use]
    pub fn last_setup_error(&self) -> Option<&EngineError> {
        self.last_setup_error.as_ref()
    }

    /// Mount the first page.
    ///
    /// Setup runs once content is ready; until then the page is pending.
    pub fn mount(&mut self, layout: Rc<dyn LayoutProvider>) -> Result<SetupOutcome, WebHostError> {
        self.page = Some(Rc::clone(&layout));
        let outcome = self.lifecycle.setup(layout);
        self.after_setup(outcome)
    }

    /// Route change: tear the current page down, then set up `layout`.
    ///
    /// A frame already requested for the old engine stays queued and is
    /// dropped as stale when it fires.
    pub fn navigate(
        &mut self,
        layout: Rc<dyn LayoutProvider>,
        restore: Option<f64>,
    ) -> Result<SetupOutcome, WebHostError> {
        #[cfg(feature = "tracing")]
        tracing::debug!(restore, "host navigating");
        self.page = Some(Rc::clone(&layout));
        let outcome = self.lifecycle.navigate(layout, restore);
        self.after_setup(outcome)
    }

    /// Unmount the current page. Returns whether an engine stopped.
    pub fn unmount(&mut self) -> bool {
        self.page = None;
        self.lifecycle.teardown()
    }

    /// Retry setup for the mounted page, for example after the engine was
    /// torn down through [`lifecycle_mut`](Self::lifecycle_mut).
    pub fn remount(&mut self) -> Result<SetupOutcome, WebHostError> {
        let layout = self.page.clone().ok_or(WebHostError::NoPage)?;
        let outcome = self.lifecycle.setup(layout);
        self.after_setup(outcome)
    }

    fn after_setup(
        &mut self,
        outcome: fscroll_runtime::Result<SetupOutcome>,
    ) -> Result<SetupOutcome, WebHostError> {
        match outcome {
            Ok(outcome) => {
                if outcome == SetupOutcome::Started {
                    self.last_setup_error = None;
                }
                if self.requested.is_none() {
                    self.request_frame();
                }
                Ok(outcome)
            }
            Err(err) => {
                self.last_setup_error = Some(err.clone());
                Err(err.into())
            }
        }
    }

    fn request_frame(&mut self) {
        self.requested = self.lifecycle.clock_handle();
    }

    /// Apply every queued host event. Returns `(applied, passthrough)`.
    pub fn pump(&mut self) -> (usize, usize) {
        let now_ms = self.clock.now_ms();
        let events: Vec<HostEvent> = self.events.drain_events().collect();
        let mut passthrough = 0;
        for event in &events {
            match *event {
                HostEvent::Input(input) => {
                    if !self.lifecycle.input(input) {
                        passthrough += 1;
                    }
                }
                HostEvent::Resize(viewport) => {
                    let outcome = self.lifecycle.resize(viewport, now_ms);
                    self.retried(outcome);
                }
                HostEvent::ContentReady(ready) => {
                    let outcome = self.lifecycle.set_content_ready(ready);
                    self.retried(outcome);
                }
                HostEvent::ContentChanged => {
                    self.lifecycle.refresh();
                }
            }
        }
        #[cfg(feature = "tracing")]
        if !events.is_empty() {
            tracing::trace!(events = events.len(), passthrough, "host events applied");
        }
        (events.len(), passthrough)
    }

    fn retried(&mut self, outcome: fscroll_runtime::Result<Option<SetupOutcome>>) {
        match outcome {
            Ok(Some(outcome)) => {
                let _ = self.after_setup(Ok(outcome));
            }
            Ok(None) => {}
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(%err, "setup retry still pending");
                self.last_setup_error = Some(err);
            }
        }
    }

    /// Advance the clock by `dt`, apply queued events, and fire the
    /// requested frame.
    pub fn advance(&mut self, dt: Duration) -> FrameReport {
        self.clock.advance(dt);
        let (events, passthrough) = self.pump();
        let mut report = FrameReport {
            events,
            passthrough,
            ..FrameReport::default()
        };

        if let Some(handle) = self.requested.take() {
            report.ran = self.lifecycle.tick(&handle, self.clock.now_ms());
            if !report.ran && handle.is_cancelled() {
                report.stale = true;
                self.stale_frames += 1;
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    generation = handle.generation(),
                    "dropped frame requested for a torn-down engine"
                );
            }
        }
        self.request_frame();
        report.position = self.lifecycle.position();
        report
    }
}
