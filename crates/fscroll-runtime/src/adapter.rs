#![forbid(unsafe_code)]

//! Scroll-source adapter.
//!
//! Trigger code never reads a native scroll coordinate. It reads the
//! driver's virtual position through a [`ScrollSource`], and writes go back
//! through the driver as immediate jumps.
//!
//! The adapter is also the only component that looks at raw gesture deltas.
//! It resolves each [`InputEvent`] to one signed amount on the virtual axis:
//!
//! 1. Events flagged `prevented` belong to a nested native scroll region and
//!    are dropped.
//! 2. The [`GestureOrientation`] picks the physical component (vertical wheel
//!    movement drives horizontal tracks by default).
//! 3. Line and page wheel modes are converted to pixels.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use fscroll_core::geometry::ViewportRect;
use fscroll_core::input::{InputEvent, WheelDeltaMode};
use tracing::trace;

use crate::config::GestureOrientation;
use crate::driver::{GestureDelta, InertialScrollDriver, ListenerId, ScrollToOptions};
use crate::registry::TriggerRegistry;

/// Read/write access to the virtual scroll coordinate.
pub trait ScrollSource {
    /// Current virtual offset.
    fn position(&self) -> f64;

    /// Jump to `value` without easing.
    fn set_position(&mut self, value: f64);

    /// Visible viewport.
    fn viewport_rect(&self) -> ViewportRect;
}

/// What happened to a routed input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// The driver's target moved.
    Applied,
    /// The driver refused it (stopped, at an edge, or zero delta).
    Ignored,
    /// Owned by a nested native scroll region.
    Prevented,
}

/// Bridges the driver, raw input, and the trigger registry.
#[derive(Debug)]
pub struct ScrollSourceAdapter {
    driver: Rc<RefCell<InertialScrollDriver>>,
    mirror: Rc<Cell<f64>>,
    listener: Option<ListenerId>,
    viewport: ViewportRect,
    orientation: GestureOrientation,
    line_height: f64,
}

impl ScrollSourceAdapter {
    /// Wire the adapter to `driver`'s scroll events.
    pub fn new(
        driver: Rc<RefCell<InertialScrollDriver>>,
        viewport: ViewportRect,
        orientation: GestureOrientation,
        line_height: f64,
    ) -> Self {
        let mirror = Rc::new(Cell::new(driver.borrow().current_position()));
        let sink = Rc::clone(&mirror);
        let listener = driver
            .borrow_mut()
            .on_scroll(move |event| sink.set(event.position));
        Self {
            driver,
            mirror,
            listener: Some(listener),
            viewport,
            orientation,
            line_height,
        }
    }

    /// Update the viewport after a re-measure.
    pub fn set_viewport(&mut self, viewport: ViewportRect) {
        self.viewport = viewport;
    }

    /// Resolve `event` to a signed amount on the virtual axis.
    #[must_use]
    pub fn resolve(&self, event: &InputEvent) -> f64 {
        let raw = match self.orientation {
            GestureOrientation::Vertical => event.dy,
            GestureOrientation::Horizontal => event.dx,
            GestureOrientation::Both => {
                if event.dx.abs() > event.dy.abs() {
                    event.dx
                } else {
                    event.dy
                }
            }
        };
        let axis = self.driver.borrow().config().axis;
        let unit = match event.mode {
            WheelDeltaMode::Pixel => 1.0,
            WheelDeltaMode::Line => self.line_height,
            WheelDeltaMode::Page => self.viewport.extent(axis),
        };
        raw * unit
    }

    /// Hand one input event to the driver.
    pub fn route_input(&self, event: InputEvent) -> RouteOutcome {
        if event.prevented {
            trace!(source = ?event.source, "input left to nested scroll region");
            return RouteOutcome::Prevented;
        }
        let amount = self.resolve(&event);
        let applied = self.driver.borrow_mut().apply_gesture(GestureDelta {
            amount,
            source: event.source,
        });
        if applied {
            RouteOutcome::Applied
        } else {
            RouteOutcome::Ignored
        }
    }

    /// Forward the current position to the registry's recompute.
    pub fn forward(&self, registry: &mut TriggerRegistry, dt: Duration) {
        registry.recompute_with(self.mirror.get(), dt);
    }

    /// Stop listening to the driver. Idempotent.
    pub fn detach(&mut self) {
        if let Some(id) = self.listener.take() {
            self.driver.borrow_mut().off(id);
        }
    }

    /// Whether the adapter still listens to the driver.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.listener.is_some()
    }
}

impl ScrollSource for ScrollSourceAdapter {
    fn position(&self) -> f64 {
        self.mirror.get()
    }

    fn set_position(&mut self, value: f64) {
        self.driver
            .borrow_mut()
            .scroll_to(value, ScrollToOptions::immediate());
    }

    fn viewport_rect(&self) -> ViewportRect {
        self.viewport
    }
}
