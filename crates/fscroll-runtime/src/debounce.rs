#![forbid(unsafe_code)]

//! Trailing debounce for viewport resizes.
//!
//! Window resizes arrive in bursts. Re-measuring on every event thrashes
//! layout, so the engine records the latest viewport and only applies it
//! once no further resize has arrived for [`ResizeDebouncer::delay`]. Time
//! is host time in milliseconds, polled from the frame loop; no timer is
//! ever armed, so cancelling is just forgetting the pending entry.

use std::time::Duration;

use fscroll_core::geometry::ViewportRect;

/// Default resize debounce.
pub const DEFAULT_RESIZE_DEBOUNCE: Duration = Duration::from_millis(150);

/// Trailing-edge debouncer for viewport sizes.
#[derive(Debug, Clone)]
pub struct ResizeDebouncer {
    delay: Duration,
    pending: Option<(f64, ViewportRect)>,
}

impl Default for ResizeDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_RESIZE_DEBOUNCE)
    }
}

impl ResizeDebouncer {
    /// Debouncer with the given quiet period.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Quiet period.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record a resize at `now_ms`, pushing the deadline back.
    pub fn schedule(&mut self, now_ms: f64, viewport: ViewportRect) {
        let deadline = now_ms + self.delay.as_micros() as f64 / 1000.0;
        self.pending = Some((deadline, viewport));
    }

    /// Take the pending viewport once its quiet period has elapsed.
    pub fn poll(&mut self, now_ms: f64) -> Option<ViewportRect> {
        match self.pending {
            Some((deadline, viewport)) if now_ms >= deadline => {
                self.pending = None;
                Some(viewport)
            }
            _ => None,
        }
    }

    /// Forget any pending resize. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Whether a resize is waiting.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
