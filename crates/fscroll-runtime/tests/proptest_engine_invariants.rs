//! Property-based invariant tests for the runtime engine.
//!
//! 1. The driver never leaves `[0, limit]`, whatever the gesture sequence
//! 2. A pinned binding without lag is pinned exactly on `[start, end)`
//! 3. Pin and unpin strictly alternate, starting with a pin
//! 4. The published section index is always in bounds
//! 5. A lagged pin is only ever released with its content at rest (p = 0 or 1)

use std::cell::RefCell;
use std::rc::Rc;

use fscroll_core::geometry::ViewportRect;
use fscroll_core::input::{InputEvent, InputSource};
use fscroll_core::track::{LayoutSnapshot, SyntheticLayout, TrackId, TrackLayout};
use fscroll_runtime::{
    DriverConfig, EngineConfig, GestureDelta, InertialScrollDriver, ScrollLifecycle,
    TriggerBinding, TriggerEvent, TriggerRegistry,
};
use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────

fn gestures() -> impl Strategy<Value = Vec<(f64, f64)>> {
    // (amount, milliseconds until the next frame)
    prop::collection::vec((-3000.0f64..3000.0, 1.0f64..80.0), 1..60)
}

fn positions() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-500.0f64..3000.0, 1..80)
}

// ═══════════════════════════════════════════════════════════════════════
// 1. Driver bounds
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn driver_stays_within_limit(limit in 0.0f64..20_000.0, steps in gestures()) {
        let mut driver = InertialScrollDriver::new(DriverConfig::default(), limit);
        let mut ts = 0.0;
        for (amount, gap) in steps {
            driver.apply_gesture(GestureDelta { amount, source: InputSource::Wheel });
            ts += gap;
            driver.step(ts);
            let state = driver.state();
            prop_assert!(state.position >= 0.0 && state.position <= limit, "{state:?}");
            prop_assert!(state.target >= 0.0 && state.target <= limit, "{state:?}");
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 2-3. Pin window and toggle ordering
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn pinned_exactly_inside_half_open_range(
        start in 0.0f64..1000.0,
        len in 1.0f64..1500.0,
        path in positions(),
    ) {
        let end = start + len;
        let mut registry = TriggerRegistry::new();
        let id = registry.register(TriggerBinding::new(start, end).pinned()).unwrap();
        for position in path {
            registry.recompute(position);
            let state = registry.state(id).unwrap();
            prop_assert_eq!(state.pinned, position >= start && position < end);
            prop_assert_eq!(state.active, position >= start && position <= end);
            prop_assert!((0.0..=1.0).contains(&state.progress));
        }
    }

    #[test]
    fn pin_and_unpin_alternate(path in positions()) {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        let mut registry = TriggerRegistry::new();
        registry
            .register(
                TriggerBinding::new(200.0, 900.0)
                    .pinned()
                    .on_toggle(move |e| sink.borrow_mut().push(e)),
            )
            .unwrap();
        for position in path {
            registry.recompute(position);
        }
        registry.clear();

        let pins: Vec<TriggerEvent> = events
            .borrow()
            .iter()
            .copied()
            .filter(|e| matches!(e, TriggerEvent::Pin | TriggerEvent::Unpin))
            .collect();
        prop_assert_eq!(pins.len() % 2, 0);
        for pair in pins.chunks(2) {
            prop_assert_eq!(pair, &[TriggerEvent::Pin, TriggerEvent::Unpin][..]);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 4. Section index bounds through the full pipeline
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn active_section_in_bounds(panels in 1usize..8, steps in gestures()) {
        let layout = Rc::new(SyntheticLayout::new(LayoutSnapshot {
            viewport: ViewportRect::from_size(1000.0, 800.0),
            document_extent: 2000.0,
            tracks: vec![TrackLayout::horizontal(TrackId(0), 300.0, vec![1000.0; panels])],
        }));
        let mut lc = ScrollLifecycle::new(EngineConfig::default());
        lc.set_content_ready(true).unwrap();
        lc.setup(layout).unwrap();
        let section = lc.active_section(TrackId(0)).unwrap();

        let mut ts = 0.0;
        for (amount, gap) in steps {
            lc.input(InputEvent::wheel(0.0, amount));
            lc.frame(ts);
            ts += gap;
            prop_assert!(section.get() < panels);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 5. Lagged pins release at rest
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn lagged_pin_releases_only_at_rest(scrub in 0.05f64..2.0, path in positions()) {
        let track = TrackId(0);
        let mut registry = TriggerRegistry::new();
        registry.set_track_distance(track, 1400.0);
        let id = registry
            .register(TriggerBinding::new(200.0, 900.0).pinned().track(track).scrub(scrub))
            .unwrap();
        for position in path {
            for _ in 0..4 {
                registry.recompute(position);
                let state = registry.state(id).unwrap();
                if !state.pinned {
                    prop_assert!(state.progress == 0.0 || state.progress == 1.0, "{state:?}");
                }
                prop_assert_eq!(state.translate.x, -state.progress * 1400.0);
            }
        }
    }
}
