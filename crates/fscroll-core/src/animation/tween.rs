#![forbid(unsafe_code)]

//! Eased positional tween used by the inertial scroll driver.
//!
//! A [`ScrollTween`] interpolates a scalar from `from` to `to` over a fixed
//! duration, shaped by an [`EasingFn`]. Retargeting restarts the tween from
//! the *current* interpolated value, so an interrupted scroll never jumps.
//!
//! # Invariants
//!
//! 1. `position()` equals `from` at elapsed 0 and `to` once complete. The
//!    easing output is renormalized against `easing(0)` so curves with a
//!    non-zero origin (such as `expo_out`) still start exactly at `from`.
//! 2. `retarget()` never changes `position()` at the moment it is called.
//! 3. Duration is clamped to at least 1ms to avoid division by zero.

use std::time::Duration;

use super::{Animation, EasingFn, expo_out};

const MIN_DURATION: Duration = Duration::from_millis(1);

/// Eased interpolation between two scroll offsets.
#[derive(Debug, Clone, Copy)]
pub struct ScrollTween {
    from: f64,
    to: f64,
    elapsed: Duration,
    duration: Duration,
    easing: EasingFn,
}

impl ScrollTween {
    /// Create a tween from `from` to `to` over `duration` using [`expo_out`].
    #[must_use]
    pub fn new(from: f64, to: f64, duration: Duration) -> Self {
        Self {
            from,
            to,
            elapsed: Duration::ZERO,
            duration: duration.max(MIN_DURATION),
            easing: expo_out,
        }
    }

    /// Set the easing curve (builder pattern).
    #[must_use]
    pub fn easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }

    /// Start offset.
    #[inline]
    #[must_use]
    pub fn from(&self) -> f64 {
        self.from
    }

    /// Destination offset.
    #[inline]
    #[must_use]
    pub fn to(&self) -> f64 {
        self.to
    }

    /// Configured duration.
    #[inline]
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Current interpolated offset.
    #[must_use]
    pub fn position(&self) -> f64 {
        if self.is_complete() {
            return self.to;
        }
        self.from + (self.to - self.from) * self.eased()
    }

    /// Restart toward `to` from the current position, keeping the easing.
    pub fn retarget(&mut self, to: f64, duration: Duration) {
        let current = self.position();
        self.from = current;
        self.to = to;
        self.elapsed = Duration::ZERO;
        self.duration = duration.max(MIN_DURATION);
    }

    fn eased(&self) -> f64 {
        let origin = (self.easing)(0.0);
        let raw = (self.easing)(self.fraction());
        if origin >= 1.0 {
            return 1.0;
        }
        ((raw - origin) / (1.0 - origin)).clamp(0.0, 1.0)
    }

    fn fraction(&self) -> f64 {
        (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }
}

impl Animation for ScrollTween {
    fn tick(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt).min(self.duration);
    }

    fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn value(&self) -> f64 {
        self.eased()
    }

    fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }
}
