//! Property-based invariant tests for the scroll math primitives.
//!
//! 1. Every built-in easing maps [0, 1] into [0, 1] and never decreases
//! 2. The active index is always in bounds and is a pure function
//! 3. Threshold boundaries agree with the uniform rule when evenly spaced
//! 4. Track distance is sum(extents) - viewport, never negative
//! 5. Scrub never overshoots its target
//! 6. Tween position stays between its endpoints

use std::time::Duration;

use fscroll_core::animation::{
    Animation, EasingFn, Scrub, ScrollTween, ease_in_out, ease_out, ease_out_cubic, expo_out,
    linear,
};
use fscroll_core::geometry::ViewportRect;
use fscroll_core::section::{SectionBoundaries, compute_active_index};
use fscroll_core::track::{TrackId, TrackLayout};
use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────

fn easing_strategy() -> impl Strategy<Value = EasingFn> {
    prop_oneof![
        Just(expo_out as EasingFn),
        Just(linear as EasingFn),
        Just(ease_out as EasingFn),
        Just(ease_out_cubic as EasingFn),
        Just(ease_in_out as EasingFn),
    ]
}

fn extents_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0f64..4000.0, 1..12)
}

// ═══════════════════════════════════════════════════════════════════════
// 1. Easing range and monotonicity
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn easing_stays_in_unit_interval(easing in easing_strategy(), t in 0.0f64..=1.0) {
        let v = easing(t);
        prop_assert!((0.0..=1.0).contains(&v), "easing({t}) = {v}");
    }

    #[test]
    fn easing_is_non_decreasing(easing in easing_strategy(), a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(easing(lo) <= easing(hi) + 1e-12);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 2-3. Active index
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn active_index_in_bounds(p in -2.0f64..3.0, n in 1usize..64) {
        let idx = compute_active_index(p, n);
        prop_assert!(idx < n);
    }

    #[test]
    fn active_index_is_idempotent(p in 0.0f64..=1.0, n in 1usize..64) {
        prop_assert_eq!(compute_active_index(p, n), compute_active_index(p, n));
    }

    #[test]
    fn active_index_monotonic_in_progress(a in 0.0f64..=1.0, b in 0.0f64..=1.0, n in 1usize..32) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(compute_active_index(lo, n) <= compute_active_index(hi, n));
    }

    #[test]
    fn even_thresholds_match_uniform(k in 0usize..=16) {
        // Progress values on a 1/16 grid are exact in binary, so the two
        // rules must agree everywhere on the grid.
        let p = k as f64 / 16.0;
        let uniform = SectionBoundaries::Uniform(4);
        let thresholds = SectionBoundaries::Thresholds(vec![0.25, 0.5, 0.75]);
        prop_assert_eq!(uniform.active_index(p), thresholds.active_index(p));
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 4. Track distance
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn total_distance_formula(extents in extents_strategy(), width in 100.0f64..3000.0) {
        let viewport = ViewportRect::from_size(width, 900.0);
        let track = TrackLayout::horizontal(TrackId(0), 0.0, extents.clone());
        let expected = (extents.iter().sum::<f64>() - width).max(0.0);
        prop_assert!((track.total_distance(&viewport) - expected).abs() < 1e-6);
        prop_assert!(track.total_distance(&viewport) >= 0.0);
    }

    #[test]
    fn equal_panels_scroll_n_minus_one_viewports(n in 1usize..10, width in 200.0f64..2000.0) {
        let viewport = ViewportRect::from_size(width, 900.0);
        let track = TrackLayout::horizontal(TrackId(0), 0.0, vec![width; n]);
        let expected = (n as f64 - 1.0) * width;
        prop_assert!((track.total_distance(&viewport) - expected).abs() < 1e-6);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 5-6. Smoothing never overshoots
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn scrub_never_overshoots(
        factor in 0.0f64..3.0,
        start in 0.0f64..=1.0,
        target in 0.0f64..=1.0,
        frames in prop::collection::vec(1u64..100, 1..60),
    ) {
        let mut scrub = Scrub::new(factor, start);
        scrub.set_target(target);
        let (lo, hi) = if start <= target { (start, target) } else { (target, start) };
        for ms in frames {
            scrub.advance(Duration::from_millis(ms));
            prop_assert!(scrub.value() >= lo - 1e-12 && scrub.value() <= hi + 1e-12);
        }
    }

    #[test]
    fn tween_stays_between_endpoints(
        easing in easing_strategy(),
        from in -500.0f64..5000.0,
        to in -500.0f64..5000.0,
        frames in prop::collection::vec(1u64..50, 1..80),
    ) {
        let mut tween = ScrollTween::new(from, to, Duration::from_millis(900)).easing(easing);
        let (lo, hi) = if from <= to { (from, to) } else { (to, from) };
        for ms in frames {
            tween.tick(Duration::from_millis(ms));
            let p = tween.position();
            prop_assert!(p >= lo - 1e-6 && p <= hi + 1e-6, "{p} outside [{lo}, {hi}]");
        }
    }
}
