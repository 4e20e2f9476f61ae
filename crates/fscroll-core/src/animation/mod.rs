#![forbid(unsafe_code)]

//! Easing curves and time-driven animation primitives.
//!
//! Every scroll interaction in the engine is shaped by an [`EasingFn`]: a pure
//! mapping from an elapsed fraction `t ∈ [0, 1]` to an eased fraction. The
//! canonical curve is [`expo_out`], a clamped exponential ease-out that gives
//! smooth-scroll its characteristic fast start and long tail.
//!
//! # Invariants
//!
//! 1. Every easing in this module maps `[0, 1]` into `[0, 1]`.
//! 2. Every easing in this module is non-decreasing on `[0, 1]`.
//! 3. Inputs outside `[0, 1]` (including NaN) are clamped before evaluation.
//!
//! User-supplied easings are not trusted: [`sanitize_easing`] samples them and
//! falls back to [`expo_out`] when either invariant is violated.

use std::time::Duration;

pub mod scrub;
pub mod tween;

pub use scrub::Scrub;
pub use tween::ScrollTween;

/// An easing curve: elapsed fraction in, eased fraction out.
pub type EasingFn = fn(f64) -> f64;

/// Number of samples used when probing an easing for monotonicity.
const MONOTONIC_SAMPLES: usize = 256;

/// Slack allowed between successive samples (absorbs float noise).
const MONOTONIC_EPSILON: f64 = 1e-9;

/// A time-driven animation advanced explicitly by the caller.
pub trait Animation {
    /// Advance by `dt`.
    fn tick(&mut self, dt: Duration);

    /// Whether the animation has reached its end state.
    fn is_complete(&self) -> bool;

    /// Normalized progress in `[0.0, 1.0]`.
    fn value(&self) -> f64;

    /// Return to the initial state.
    fn reset(&mut self);
}

#[inline]
fn clamp_unit(t: f64) -> f64 {
    if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) }
}

/// Identity easing.
#[must_use]
pub fn linear(t: f64) -> f64 {
    clamp_unit(t)
}

/// Quadratic ease-out.
#[must_use]
pub fn ease_out(t: f64) -> f64 {
    let t = clamp_unit(t);
    1.0 - (1.0 - t) * (1.0 - t)
}

/// Cubic ease-out.
#[must_use]
pub fn ease_out_cubic(t: f64) -> f64 {
    let inv = 1.0 - clamp_unit(t);
    1.0 - inv * inv * inv
}

/// Quadratic ease-in-out.
#[must_use]
pub fn ease_in_out(t: f64) -> f64 {
    let t = clamp_unit(t);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

/// Clamped exponential ease-out: `min(1, 1.001 - 2^(-10t))`.
///
/// The `1.001` offset makes the curve reach exactly 1.0 slightly before
/// `t = 1`, so tweens settle on their target instead of crawling the last
/// sub-pixel forever.
#[must_use]
pub fn expo_out(t: f64) -> f64 {
    let t = clamp_unit(t);
    (1.001 - 2.0_f64.powf(-10.0 * t)).min(1.0)
}

/// Names accepted by [`easing_by_name`].
pub const EASING_NAMES: &[&str] = &[
    "expo_out",
    "linear",
    "ease_out",
    "ease_out_cubic",
    "ease_in_out",
];

/// Resolve a named easing (used by configuration files).
#[must_use]
pub fn easing_by_name(name: &str) -> Option<EasingFn> {
    match name {
        "expo_out" => Some(expo_out),
        "linear" => Some(linear),
        "ease_out" => Some(ease_out),
        "ease_out_cubic" => Some(ease_out_cubic),
        "ease_in_out" => Some(ease_in_out),
        _ => None,
    }
}

/// Check that `easing` stays inside `[0, 1]` and never decreases on `[0, 1]`.
#[must_use]
pub fn is_well_formed(easing: EasingFn) -> bool {
    let mut prev = f64::NEG_INFINITY;
    for i in 0..=MONOTONIC_SAMPLES {
        let t = i as f64 / MONOTONIC_SAMPLES as f64;
        let v = easing(t);
        if !v.is_finite() || !(0.0..=1.0).contains(&v) {
            return false;
        }
        if v < prev - MONOTONIC_EPSILON {
            return false;
        }
        prev = v;
    }
    true
}

/// Return `easing` if it is well formed, otherwise [`expo_out`].
#[must_use]
pub fn sanitize_easing(easing: EasingFn) -> EasingFn {
    if is_well_formed(easing) {
        easing
    } else {
        #[cfg(feature = "tracing")]
        tracing::warn!("easing is not monotonic on [0, 1]; falling back to expo_out");
        expo_out
    }
}
