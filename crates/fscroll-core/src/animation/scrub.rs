#![forbid(unsafe_code)]

//! Scrub: lagged progress for scroll-linked animations.
//!
//! A scroll-linked animation should not track raw scroll progress 1:1,
//! otherwise every stutter in the input shows up in the animation. [`Scrub`]
//! follows a target with exponential smoothing where the scrub factor is the
//! time constant in seconds: after `factor` seconds roughly 63% of the gap
//! has been closed, after `3 × factor` about 95%.
//!
//! # Invariants
//!
//! 1. `factor == 0` means no lag: `value()` equals the target after any tick.
//! 2. `value()` always lies between its previous value and the target
//!    (no overshoot), and therefore stays in `[0, 1]` for targets in `[0, 1]`.
//! 3. Once within [`SETTLE_EPSILON`] of the target the value snaps to it.
//!
//! # Failure Modes
//!
//! - Negative or non-finite factor: treated as 0 (no lag).
//! - Zero `dt`: the value does not move (except when `factor == 0`).

use std::time::Duration;

/// Distance below which the scrub snaps onto its target.
pub const SETTLE_EPSILON: f64 = 1e-4;

/// Exponentially smoothed follower of a progress target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scrub {
    factor: f64,
    value: f64,
    target: f64,
}

impl Scrub {
    /// Create a scrub with the given lag in seconds, starting at `initial`.
    #[must_use]
    pub fn new(factor: f64, initial: f64) -> Self {
        let factor = if factor.is_finite() && factor > 0.0 {
            factor
        } else {
            0.0
        };
        Self {
            factor,
            value: initial,
            target: initial,
        }
    }

    /// Lag in seconds.
    #[inline]
    #[must_use]
    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Current smoothed value.
    #[inline]
    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Current target.
    #[inline]
    #[must_use]
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Whether the smoothed value has reached the target.
    #[inline]
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.value == self.target
    }

    /// Set a new target; with no lag the value follows immediately.
    pub fn set_target(&mut self, target: f64) {
        self.target = target;
        if self.factor == 0.0 {
            self.value = target;
        }
    }

    /// Jump straight to `value` (used when a binding is first registered).
    pub fn snap_to(&mut self, value: f64) {
        self.value = value;
        self.target = value;
    }

    /// Advance the smoothing by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        if self.factor == 0.0 {
            self.value = self.target;
            return;
        }
        let secs = dt.as_secs_f64();
        if secs <= 0.0 {
            return;
        }
        let alpha = 1.0 - (-secs / self.factor).exp();
        self.value += (self.target - self.value) * alpha;
        if (self.target - self.value).abs() < SETTLE_EPSILON {
            self.value = self.target;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS_16: Duration = Duration::from_millis(16);

    #[test]
    fn zero_factor_follows_immediately() {
        let mut scrub = Scrub::new(0.0, 0.0);
        scrub.set_target(0.5);
        assert_eq!(scrub.value(), 0.5);
        scrub.advance(Duration::ZERO);
        assert_eq!(scrub.value(), 0.5);
    }

    #[test]
    fn invalid_factor_means_no_lag() {
        assert_eq!(Scrub::new(-1.0, 0.0).factor(), 0.0);
        assert_eq!(Scrub::new(f64::NAN, 0.0).factor(), 0.0);
        assert_eq!(Scrub::new(f64::INFINITY, 0.0).factor(), 0.0);
    }

    #[test]
    fn lag_approaches_without_overshoot() {
        let mut scrub = Scrub::new(0.5, 0.0);
        scrub.set_target(1.0);
        let mut prev = 0.0;
        for _ in 0..30 {
            scrub.advance(MS_16);
            assert!(scrub.value() >= prev);
            assert!(scrub.value() <= 1.0);
            prev = scrub.value();
        }
        assert!(prev < 1.0, "0.48s with a 0.5s lag must not have settled");
    }

    #[test]
    fn one_time_constant_closes_most_of_the_gap() {
        let mut scrub = Scrub::new(1.0, 0.0);
        scrub.set_target(1.0);
        scrub.advance(Duration::from_secs(1));
        assert!((scrub.value() - (1.0 - (-1.0f64).exp())).abs() < 1e-9);
    }

    #[test]
    fn settles_eventually() {
        let mut scrub = Scrub::new(0.25, 0.0);
        scrub.set_target(1.0);
        for _ in 0..600 {
            scrub.advance(MS_16);
        }
        assert!(scrub.is_settled());
        assert_eq!(scrub.value(), 1.0);
    }

    #[test]
    fn reversal_moves_back() {
        let mut scrub = Scrub::new(0.2, 1.0);
        scrub.set_target(0.0);
        scrub.advance(MS_16);
        assert!(scrub.value() < 1.0);
    }
}
