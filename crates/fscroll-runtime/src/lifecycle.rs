#![forbid(unsafe_code)]

//! Setup, per-frame pipeline, resize handling, and teardown.
//!
//! [`ScrollLifecycle`] owns at most one running engine per page. Everything
//! the engine needs is built in one place, wired in a fixed order, and
//! disposed in a fixed order.
//!
//! # Setup
//!
//! `setup(layout)` records the request; it only runs once the content-ready
//! gate is open. Running it measures the page, builds the driver, adapter,
//! registry (one pinned binding per pinned track) and one section mapper per
//! track, subscribes the single frame clock, and publishes `ready = true`.
//! The registry is seeded with the starting offset before any track binds,
//! so a restored page starts with its pins and sections already in place.
//! An unsettled measurement keeps the request pending; the next ready or
//! resize event tries again.
//!
//! # Frame pipeline
//!
//! Every admitted frame runs, in this order:
//!
//! 1. apply a debounced resize, if its quiet period has elapsed;
//! 2. route the input coalesced since the previous frame;
//! 3. step the driver;
//! 4. forward the position through the adapter to the registry;
//! 5. update every section mapper.
//!
//! # Teardown
//!
//! Cancel the clock, unregister all bindings, dispose the driver, clear the
//! debounce and input queues, publish `ready = false`. Teardown is
//! synchronous, idempotent, and always completes before the next setup.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use fscroll_core::geometry::ViewportRect;
use fscroll_core::input::{InputCoalescer, InputEvent};
use fscroll_core::section::SectionProgressState;
use fscroll_core::track::{LayoutProvider, LayoutSnapshot, TrackId, TrackLayout};
use tracing::{debug, debug_span, info_span, trace, warn};

use crate::adapter::{RouteOutcome, ScrollSource, ScrollSourceAdapter};
use crate::clock::{ClockHandle, FrameClock};
use crate::config::EngineConfig;
use crate::debounce::ResizeDebouncer;
use crate::driver::{InertialScrollDriver, ScrollToOptions, VirtualScrollState};
use crate::error::{EngineError, Result};
use crate::mapper::SectionMapper;
use crate::reactive::Observable;
use crate::registry::{TriggerBinding, TriggerId, TriggerRegistry, TriggerState};

/// Result of a setup request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupOutcome {
    /// Waiting for the content-ready gate.
    Deferred,
    /// A new engine is running.
    Started,
    /// An engine was already running; nothing changed.
    AlreadyRunning,
}

struct PendingSetup {
    layout: Rc<dyn LayoutProvider>,
    offset: f64,
}

/// One measured track and the engine pieces derived from it.
struct TrackBinding {
    layout: TrackLayout,
    pin: Option<TriggerId>,
    mapper: SectionMapper,
}

impl TrackBinding {
    fn bind(
        track: &TrackLayout,
        viewport: &ViewportRect,
        registry: &mut TriggerRegistry,
        default_scrub: f64,
    ) -> Self {
        registry.set_track_distance(track.id, track.total_distance(viewport));
        let pin = if track.pinned {
            register_pin(track, viewport, registry, default_scrub)
        } else {
            None
        };
        let mapper = SectionMapper::new(track.id, track.boundaries())
            .unwrap_or_else(|_| SectionMapper::uniform(track.id, track.panel_count()));
        Self {
            layout: track.clone(),
            pin,
            mapper,
        }
    }

    fn refresh(
        &mut self,
        track: &TrackLayout,
        viewport: &ViewportRect,
        registry: &mut TriggerRegistry,
        default_scrub: f64,
    ) {
        registry.set_track_distance(track.id, track.total_distance(viewport));
        match (self.pin, track.pinned) {
            (Some(id), true) => {
                if let Err(err) = registry.update_range(id, track.start, track.end(viewport)) {
                    debug!(track = %track.id, %err, "pin released after re-measure");
                    registry.unregister(id);
                    self.pin = None;
                }
            }
            (Some(id), false) => {
                registry.unregister(id);
                self.pin = None;
            }
            (None, true) => {
                self.pin = register_pin(track, viewport, registry, default_scrub);
            }
            (None, false) => {}
        }
        if self.mapper.set_boundaries(track.boundaries()).is_err() {
            self.mapper.set_uniform(track.panel_count());
        }
        self.layout = track.clone();
    }

    fn progress(&self, registry: &TriggerRegistry, position: f64, viewport: &ViewportRect) -> f64 {
        self.pin
            .and_then(|id| registry.state(id))
            .map_or_else(|| self.layout.progress_at(position, viewport), |s| s.progress)
    }
}

fn register_pin(
    track: &TrackLayout,
    viewport: &ViewportRect,
    registry: &mut TriggerRegistry,
    default_scrub: f64,
) -> Option<TriggerId> {
    let binding = TriggerBinding::new(track.start, track.end(viewport))
        .pinned()
        .track(track.id)
        .axis(track.axis)
        .scrub(track.scrub.unwrap_or(default_scrub));
    match registry.register(binding) {
        Ok(id) => Some(id),
        Err(err) => {
            debug!(track = %track.id, %err, "track scrolls without pinning");
            None
        }
    }
}

/// A running engine.
struct Engine {
    layout: Rc<dyn LayoutProvider>,
    snapshot: LayoutSnapshot,
    driver: Rc<RefCell<InertialScrollDriver>>,
    adapter: ScrollSourceAdapter,
    registry: TriggerRegistry,
    tracks: Vec<TrackBinding>,
    coalescer: InputCoalescer,
    debouncer: ResizeDebouncer,
    handle: ClockHandle,
}

impl Engine {
    fn build(
        config: &EngineConfig,
        layout: Rc<dyn LayoutProvider>,
        snapshot: LayoutSnapshot,
        offset: f64,
        handle: ClockHandle,
    ) -> Self {
        let driver = Rc::new(RefCell::new(InertialScrollDriver::new(
            config.driver_config(),
            snapshot.scroll_limit(),
        )));
        if offset != 0.0 {
            driver
                .borrow_mut()
                .scroll_to(offset, ScrollToOptions::immediate());
        }
        let adapter = ScrollSourceAdapter::new(
            Rc::clone(&driver),
            snapshot.viewport,
            config.gesture,
            config.line_height,
        );
        let mut registry = TriggerRegistry::new();
        registry.set_frame_delta(config.fallback_frame_delta());
        registry.seed(driver.borrow().state().position);
        let tracks = snapshot
            .tracks
            .iter()
            .map(|t| TrackBinding::bind(t, &snapshot.viewport, &mut registry, config.track_scrub))
            .collect();

        let mut engine = Self {
            layout,
            snapshot,
            driver,
            adapter,
            registry,
            tracks,
            coalescer: InputCoalescer::new(),
            debouncer: ResizeDebouncer::new(config.resize_debounce()),
            handle,
        };
        engine.sync(config.fallback_frame_delta());
        engine
    }

    fn frame(&mut self, dt: std::time::Duration, timestamp_ms: f64, default_scrub: f64) {
        if let Some(viewport) = self.debouncer.poll(timestamp_ms) {
            debug!(
                width = viewport.width,
                height = viewport.height,
                "debounced resize applied"
            );
            self.remeasure(default_scrub);
        }
        for event in self.coalescer.flush() {
            self.adapter.route_input(event);
        }
        self.driver.borrow_mut().step(timestamp_ms);
        self.sync(dt);
    }

    /// Adapter forward, registry recompute, mapper update.
    fn sync(&mut self, dt: std::time::Duration) {
        self.adapter.forward(&mut self.registry, dt);
        let position = self.adapter.position();
        let viewport = self.snapshot.viewport;
        for track in &mut self.tracks {
            let progress = track.progress(&self.registry, position, &viewport);
            if let Some(index) = track.mapper.update(progress) {
                trace!(track = %track.layout.id, index, "active section changed");
            }
        }
    }

    fn remeasure(&mut self, default_scrub: f64) -> bool {
        let _span = debug_span!("fscroll.resize").entered();
        let snapshot = self.layout.measure();
        if let Err(issue) = snapshot.check() {
            warn!(%issue, "re-measure skipped; keeping previous layout");
            return false;
        }
        self.adapter.set_viewport(snapshot.viewport);
        self.driver.borrow_mut().set_limit(snapshot.scroll_limit());

        let registry = &mut self.registry;
        self.tracks.retain(|binding| {
            let keep = snapshot.track(binding.layout.id).is_some();
            if !keep && let Some(id) = binding.pin {
                registry.unregister(id);
            }
            keep
        });
        for track in &snapshot.tracks {
            match self.tracks.iter_mut().find(|b| b.layout.id == track.id) {
                Some(binding) => {
                    binding.refresh(track, &snapshot.viewport, &mut self.registry, default_scrub);
                }
                None => self.tracks.push(TrackBinding::bind(
                    track,
                    &snapshot.viewport,
                    &mut self.registry,
                    default_scrub,
                )),
            }
        }
        debug!(
            limit = snapshot.scroll_limit(),
            tracks = snapshot.tracks.len() as u64,
            "layout re-measured"
        );
        self.snapshot = snapshot;
        true
    }

    fn track(&self, id: TrackId) -> Option<&TrackBinding> {
        self.tracks.iter().find(|b| b.layout.id == id)
    }
}

/// Owns the engine of one page across mount, resize, and unmount.
pub struct ScrollLifecycle {
    config: EngineConfig,
    content_ready: bool,
    pending: Option<PendingSetup>,
    engine: Option<Engine>,
    clock: FrameClock,
    ready: Observable<bool>,
}

impl fmt::Debug for ScrollLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollLifecycle")
            .field("content_ready", &self.content_ready)
            .field("pending", &self.pending.is_some())
            .field("running", &self.engine.is_some())
            .field("clock", &self.clock)
            .finish()
    }
}

impl Default for ScrollLifecycle {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl ScrollLifecycle {
    /// Create an idle lifecycle; invalid config values are repaired.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let config = config.sanitized();
        let clock = FrameClock::new(config.fallback_frame_delta());
        Self {
            config,
            content_ready: false,
            pending: None,
            engine: None,
            clock,
            ready: Observable::new(false),
        }
    }

    /// Effective configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Open or close the content-ready gate.
    ///
    /// Opening it runs a pending setup; returns `None` when nothing was
    /// pending. Closing it never tears a running engine down.
    pub fn set_content_ready(&mut self, ready: bool) -> Result<Option<SetupOutcome>> {
        self.content_ready = ready;
        if ready && self.engine.is_none() && self.pending.is_some() {
            return self.start_pending().map(Some);
        }
        Ok(None)
    }

    /// Whether the content-ready gate is open.
    #[must_use]
    pub fn is_content_ready(&self) -> bool {
        self.content_ready
    }

    /// Request setup starting at offset 0.
    pub fn setup(&mut self, layout: Rc<dyn LayoutProvider>) -> Result<SetupOutcome> {
        self.setup_at(layout, 0.0)
    }

    /// Request setup starting at a restored `offset`.
    ///
    /// Fails with [`EngineError::Measurement`] when the layout has not
    /// settled; the request then stays pending.
    pub fn setup_at(&mut self, layout: Rc<dyn LayoutProvider>, offset: f64) -> Result<SetupOutcome> {
        if self.engine.is_some() {
            debug!("setup ignored: engine already running");
            return Ok(SetupOutcome::AlreadyRunning);
        }
        self.pending = Some(PendingSetup { layout, offset });
        if !self.content_ready {
            debug!("setup deferred until content is ready");
            return Ok(SetupOutcome::Deferred);
        }
        self.start_pending()
    }

    fn start_pending(&mut self) -> Result<SetupOutcome> {
        let Some(pending) = self.pending.take() else {
            return Ok(SetupOutcome::Deferred);
        };
        let span = info_span!("fscroll.setup", tracks = tracing::field::Empty).entered();
        let snapshot = pending.layout.measure();
        if let Err(issue) = snapshot.check() {
            debug!(%issue, "setup deferred: layout not settled");
            self.pending = Some(pending);
            return Err(EngineError::Measurement(issue));
        }
        span.record("tracks", snapshot.tracks.len() as u64);

        let handle = self.clock.subscribe();
        let engine = Engine::build(
            &self.config,
            pending.layout,
            snapshot,
            pending.offset,
            handle,
        );
        debug!(
            limit = engine.driver.borrow().limit(),
            position = engine.adapter.position(),
            bindings = engine.registry.len() as u64,
            "setup started"
        );
        self.engine = Some(engine);
        self.ready.set(true);
        Ok(SetupOutcome::Started)
    }

    /// Tear everything down. Idempotent; returns whether an engine stopped.
    pub fn teardown(&mut self) -> bool {
        self.pending = None;
        let Some(mut engine) = self.engine.take() else {
            return false;
        };
        self.clock.cancel();
        debug!("teardown: clock cancelled");
        let released = engine.registry.clear();
        debug!(released, "teardown: bindings unregistered");
        engine.adapter.detach();
        engine.driver.borrow_mut().destroy();
        debug!("teardown: driver disposed");
        engine.debouncer.cancel();
        engine.coalescer.clear();
        debug!("teardown: pending resize and input cleared");
        self.ready.set(false);
        true
    }

    /// Tear down the current page and set up the next one.
    pub fn navigate(
        &mut self,
        layout: Rc<dyn LayoutProvider>,
        restore: Option<f64>,
    ) -> Result<SetupOutcome> {
        self.teardown();
        self.setup_at(layout, restore.unwrap_or(0.0))
    }

    /// Run one frame for the engine's own clock subscription.
    pub fn frame(&mut self, timestamp_ms: f64) -> bool {
        match self.clock_handle() {
            Some(handle) => self.tick(&handle, timestamp_ms),
            None => false,
        }
    }

    /// Run one frame on behalf of a host-held `handle`.
    ///
    /// A stale handle (from a torn-down or replaced engine) does nothing.
    pub fn tick(&mut self, handle: &ClockHandle, timestamp_ms: f64) -> bool {
        let Some(dt) = self.clock.tick(handle, timestamp_ms) else {
            return false;
        };
        let Some(engine) = self.engine.as_mut() else {
            return false;
        };
        engine.frame(dt, timestamp_ms, self.config.track_scrub);
        true
    }

    /// Clock handle of the running engine.
    #[must_use]
    pub fn clock_handle(&self) -> Option<ClockHandle> {
        self.engine.as_ref().map(|e| e.handle.clone())
    }

    /// Queue a raw input event for the next frame.
    ///
    /// Returns `false` when the engine does not take the event (no engine,
    /// or the event belongs to a nested native scroll region), meaning the
    /// host should let it scroll natively.
    pub fn input(&mut self, event: InputEvent) -> bool {
        let Some(engine) = self.engine.as_mut() else {
            return false;
        };
        match engine.coalescer.push(event) {
            None => true,
            Some(ready) => engine.adapter.route_input(ready) != RouteOutcome::Prevented,
        }
    }

    /// Report a viewport resize at host time `now_ms`.
    ///
    /// A running engine re-measures after the debounce. Without one, a
    /// pending setup is retried immediately (if the gate is open).
    pub fn resize(&mut self, viewport: ViewportRect, now_ms: f64) -> Result<Option<SetupOutcome>> {
        if let Some(engine) = self.engine.as_mut() {
            engine.debouncer.schedule(now_ms, viewport);
            debug!(
                width = viewport.width,
                height = viewport.height,
                "resize scheduled"
            );
            return Ok(None);
        }
        if self.content_ready && self.pending.is_some() {
            return self.start_pending().map(Some);
        }
        Ok(None)
    }

    /// Re-measure immediately (content size changed without a resize).
    pub fn refresh(&mut self) -> bool {
        let scrub = self.config.track_scrub;
        match self.engine.as_mut() {
            Some(engine) => {
                let applied = engine.remeasure(scrub);
                if applied {
                    engine.sync(std::time::Duration::ZERO);
                }
                applied
            }
            None => false,
        }
    }

    /// Whether an engine is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.engine.is_some()
    }

    /// Whether a setup request is waiting.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The published ready flag (shared across engines).
    #[must_use]
    pub fn ready(&self) -> Observable<bool> {
        self.ready.clone()
    }

    /// Virtual position of the running engine.
    #[must_use]
    pub fn position(&self) -> Option<f64> {
        self.engine.as_ref().map(|e| e.adapter.position())
    }

    /// Driver state of the running engine.
    #[must_use]
    pub fn driver_state(&self) -> Option<VirtualScrollState> {
        self.engine.as_ref().map(|e| e.driver.borrow().state())
    }

    /// Scroll limit of the running engine.
    #[must_use]
    pub fn scroll_limit(&self) -> Option<f64> {
        self.engine.as_ref().map(|e| e.driver.borrow().limit())
    }

    /// Navigate within the page.
    pub fn scroll_to(&mut self, offset: f64, options: ScrollToOptions) -> Result<()> {
        let engine = self.engine.as_mut().ok_or(EngineError::TornDown)?;
        engine.driver.borrow_mut().scroll_to(offset, options);
        Ok(())
    }

    /// Suspend gesture input (for example while a menu is open).
    pub fn stop(&mut self) {
        if let Some(engine) = self.engine.as_mut() {
            engine.driver.borrow_mut().stop();
            engine.coalescer.clear();
        }
    }

    /// Resume gesture input.
    pub fn start(&mut self) {
        if let Some(engine) = self.engine.as_mut() {
            engine.driver.borrow_mut().start();
        }
    }

    /// Register a binding with the running engine.
    pub fn register(&mut self, binding: TriggerBinding) -> Result<TriggerId> {
        let engine = self.engine.as_mut().ok_or(EngineError::TornDown)?;
        engine.registry.register(binding)
    }

    /// Unregister a binding; a pinned element is released immediately.
    pub fn unregister(&mut self, id: TriggerId) -> bool {
        self.engine
            .as_mut()
            .is_some_and(|e| e.registry.unregister(id))
    }

    /// State of a binding.
    #[must_use]
    pub fn trigger_state(&self, id: TriggerId) -> Option<TriggerState> {
        self.engine.as_ref()?.registry.state(id)
    }

    /// State of a track's pin binding.
    #[must_use]
    pub fn pin_state(&self, track: TrackId) -> Option<TriggerState> {
        let engine = self.engine.as_ref()?;
        engine.registry.state(engine.track(track)?.pin?)
    }

    /// Current scrollable distance of a track.
    #[must_use]
    pub fn track_distance(&self, track: TrackId) -> Option<f64> {
        let engine = self.engine.as_ref()?;
        engine.track(track)?;
        Some(engine.registry.track_distance(track))
    }

    /// Published active-section index of a track.
    #[must_use]
    pub fn active_section(&self, track: TrackId) -> Option<Observable<usize>> {
        Some(self.engine.as_ref()?.track(track)?.mapper.observable())
    }

    /// Section state of a track.
    #[must_use]
    pub fn section_state(&self, track: TrackId) -> Option<SectionProgressState> {
        Some(self.engine.as_ref()?.track(track)?.mapper.state())
    }
}

impl Drop for ScrollLifecycle {
    fn drop(&mut self) {
        self.teardown();
    }
}
