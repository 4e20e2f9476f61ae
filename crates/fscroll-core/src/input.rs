#![forbid(unsafe_code)]

//! Raw scroll input and per-frame coalescing.
//!
//! Hosts push [`InputEvent`]s as they arrive from the platform (wheel,
//! trackpad, touch). Between two animation frames there can be dozens of
//! them; feeding each one straight into the driver retargets the tween on
//! every event for no visual gain.
//!
//! [`InputCoalescer`] sums deltas per [`InputSource`] and hands back at most
//! one event per source on [`flush`](InputCoalescer::flush):
//!
//! - Wheel and touch are kept apart because they use different gains.
//! - Wheel events in different [`WheelDeltaMode`]s are never merged; the
//!   pending one is returned immediately and the new one starts a fresh run.
//! - Events flagged `prevented` (originating in a nested scroll region that
//!   scrolls natively) pass through untouched so the caller can drop them.
//!
//! # Usage
//!
//! ```
//! use fscroll_core::input::{InputCoalescer, InputEvent};
//!
//! let mut coalescer = InputCoalescer::new();
//! assert!(coalescer.push(InputEvent::wheel(0.0, 40.0)).is_none());
//! assert!(coalescer.push(InputEvent::wheel(0.0, 60.0)).is_none());
//!
//! let pending = coalescer.flush();
//! assert_eq!(pending.len(), 1);
//! assert_eq!(pending[0].dy, 100.0);
//! ```

/// Physical origin of a scroll gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputSource {
    /// Mouse wheel or trackpad.
    Wheel,
    /// Touch drag.
    Touch,
}

/// Unit of a wheel delta, mirroring the DOM `deltaMode` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WheelDeltaMode {
    /// Deltas are in pixels.
    #[default]
    Pixel,
    /// Deltas are in lines.
    Line,
    /// Deltas are in pages.
    Page,
}

/// A single raw scroll gesture sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputEvent {
    /// Where the gesture came from.
    pub source: InputSource,
    /// Horizontal delta (positive = rightwards).
    pub dx: f64,
    /// Vertical delta (positive = downwards).
    pub dy: f64,
    /// Unit of `dx`/`dy` (meaningful for wheel input only).
    pub mode: WheelDeltaMode,
    /// The event originated inside a nested region that scrolls natively.
    pub prevented: bool,
}

impl InputEvent {
    /// Pixel-mode wheel event.
    #[must_use]
    pub const fn wheel(dx: f64, dy: f64) -> Self {
        Self {
            source: InputSource::Wheel,
            dx,
            dy,
            mode: WheelDeltaMode::Pixel,
            prevented: false,
        }
    }

    /// Touch drag event (already in pixels).
    #[must_use]
    pub const fn touch(dx: f64, dy: f64) -> Self {
        Self {
            source: InputSource::Touch,
            dx,
            dy,
            mode: WheelDeltaMode::Pixel,
            prevented: false,
        }
    }

    /// Set the delta mode (builder pattern).
    #[must_use]
    pub const fn with_mode(mut self, mode: WheelDeltaMode) -> Self {
        self.mode = mode;
        self
    }

    /// Mark the event as owned by a nested native scroll region.
    #[must_use]
    pub const fn prevented(mut self) -> Self {
        self.prevented = true;
        self
    }

    fn absorbs(&self, other: &InputEvent) -> bool {
        self.source == other.source && self.mode == other.mode
    }
}

/// Sums scroll deltas between frames.
///
/// Not thread-safe; owned by whoever receives host input.
#[derive(Debug, Clone, Default)]
pub struct InputCoalescer {
    pending_wheel: Option<InputEvent>,
    pending_touch: Option<InputEvent>,
}

impl InputCoalescer {
    /// Create an empty coalescer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push an event.
    ///
    /// Returns `Some(event)` when something must be processed now: a
    /// `prevented` event, or a pending wheel run displaced by a wheel event in
    /// a different delta mode. Returns `None` when the event was absorbed.
    pub fn push(&mut self, event: InputEvent) -> Option<InputEvent> {
        if event.prevented {
            return Some(event);
        }
        let slot = match event.source {
            InputSource::Wheel => &mut self.pending_wheel,
            InputSource::Touch => &mut self.pending_touch,
        };
        if let Some(pending) = slot.as_mut() {
            if pending.absorbs(&event) {
                pending.dx += event.dx;
                pending.dy += event.dy;
                return None;
            }
        }
        slot.replace(event)
    }

    /// Whether any delta is waiting.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending_wheel.is_some() || self.pending_touch.is_some()
    }

    /// Take all pending events (wheel first, then touch).
    pub fn flush(&mut self) -> Vec<InputEvent> {
        self.pending_wheel
            .take()
            .into_iter()
            .chain(self.pending_touch.take())
            .collect()
    }

    /// Drop anything pending (used on teardown).
    pub fn clear(&mut self) {
        self.pending_wheel = None;
        self.pending_touch = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_source_sums() {
        let mut c = InputCoalescer::new();
        assert!(c.push(InputEvent::wheel(1.0, 10.0)).is_none());
        assert!(c.push(InputEvent::wheel(2.0, -4.0)).is_none());
        let out = c.flush();
        assert_eq!(out, vec![InputEvent::wheel(3.0, 6.0)]);
        assert!(!c.has_pending());
    }

    #[test]
    fn sources_kept_apart() {
        let mut c = InputCoalescer::new();
        c.push(InputEvent::touch(0.0, 5.0));
        c.push(InputEvent::wheel(0.0, 7.0));
        let out = c.flush();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].source, InputSource::Wheel);
        assert_eq!(out[1].source, InputSource::Touch);
    }

    #[test]
    fn mode_change_displaces_pending_run() {
        let mut c = InputCoalescer::new();
        c.push(InputEvent::wheel(0.0, 3.0));
        let displaced = c.push(InputEvent::wheel(0.0, 1.0).with_mode(WheelDeltaMode::Line));
        assert_eq!(displaced, Some(InputEvent::wheel(0.0, 3.0)));
        let out = c.flush();
        assert_eq!(out[0].mode, WheelDeltaMode::Line);
        assert_eq!(out[0].dy, 1.0);
    }

    #[test]
    fn prevented_passes_through() {
        let mut c = InputCoalescer::new();
        let e = InputEvent::wheel(0.0, 3.0).prevented();
        assert_eq!(c.push(e), Some(e));
        assert!(!c.has_pending());
    }

    #[test]
    fn clear_drops_pending() {
        let mut c = InputCoalescer::new();
        c.push(InputEvent::touch(0.0, 5.0));
        c.clear();
        assert!(c.flush().is_empty());
    }
}
