#![forbid(unsafe_code)]

//! Trigger/pin registry.
//!
//! A [`TriggerBinding`] ties a range of the virtual scroll position to a
//! progress callback. On every [`recompute`](TriggerRegistry::recompute) each
//! binding derives
//!
//! ```text
//! p = clamp((position - start) / (end - start), 0, 1)
//! ```
//!
//! lags it through its [`Scrub`] and hands the smoothed value to
//! `on_progress`. Pinned bindings additionally report a translation of
//! `-p * distance` along their track axis, where `distance` is looked up from
//! the registry's track table at recompute time, so a resize that updates the
//! table is visible on the very next recompute.
//!
//! # Range semantics
//!
//! - A binding is *active* while `start <= position <= end`.
//! - A pinned binding is *pinned* while `start <= position < end`, and
//!   also while its scrubbed progress is still strictly between 0 and 1. The
//!   pin releases only once the translation has reached `p = 1` (or `p = 0`
//!   scrolling back), so the content never jumps when it returns to flow.
//! - Leaving a range still delivers the final clamped progress (0 or 1), and
//!   a scrubbed binding keeps receiving progress until its lag settles.
//!
//! # Toggle events
//!
//! Crossing range edges emits [`TriggerEvent`]s. A recompute that jumps over
//! a whole range emits both edge events in order (`Enter` then `Leave`, or
//! `EnterBack` then `LeaveBack`). `Unpin` always precedes the phase events of
//! the same recompute and `Pin` follows them. A scrubbed pin that is still
//! settling after its range was left emits `Unpin` on the recompute where
//! the lag reaches its target.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use fscroll_core::animation::Scrub;
use fscroll_core::geometry::{Axis, Translate};
use fscroll_core::track::TrackId;
use tracing::{trace, warn};

use crate::error::{EngineError, Result};

/// Frame delta used when the caller does not supply one.
pub const DEFAULT_FRAME_DELTA: Duration = Duration::from_micros(16_667);

/// Identifier of a registered binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TriggerId(u64);

impl TriggerId {
    /// Raw numeric id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TriggerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "trigger#{}", self.0)
    }
}

/// Edge crossings reported to `on_toggle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerEvent {
    /// Scrolled forward past `start`.
    Enter,
    /// Scrolled forward past `end`.
    Leave,
    /// Scrolled backward past `end`.
    EnterBack,
    /// Scrolled backward past `start`.
    LeaveBack,
    /// Element became fixed.
    Pin,
    /// Element returned to normal flow.
    Unpin,
}

type ProgressFn = Box<dyn FnMut(f64)>;
type ToggleFn = Box<dyn FnMut(TriggerEvent)>;

/// Declarative description of a scroll-linked binding.
pub struct TriggerBinding {
    start: f64,
    end: f64,
    scrub: f64,
    pinned: bool,
    track: Option<TrackId>,
    axis: Axis,
    on_progress: Option<ProgressFn>,
    on_toggle: Option<ToggleFn>,
}

impl fmt::Debug for TriggerBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriggerBinding")
            .field("start", &self.start)
            .field("end", &self.end)
            .field("scrub", &self.scrub)
            .field("pinned", &self.pinned)
            .field("track", &self.track)
            .field("axis", &self.axis)
            .finish_non_exhaustive()
    }
}

impl TriggerBinding {
    /// Binding over `[start, end]` with no lag, not pinned.
    #[must_use]
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            start,
            end,
            scrub: 0.0,
            pinned: false,
            track: None,
            axis: Axis::Horizontal,
            on_progress: None,
            on_toggle: None,
        }
    }

    /// Lag in seconds applied to progress (builder pattern).
    #[must_use]
    pub fn scrub(mut self, factor: f64) -> Self {
        self.scrub = factor;
        self
    }

    /// Pin the element while the range is active (builder pattern).
    #[must_use]
    pub fn pinned(mut self) -> Self {
        self.pinned = true;
        self
    }

    /// Attach the binding to a track (builder pattern).
    ///
    /// Bindings on the same track must not overlap, and a pinned binding
    /// translates by that track's scrollable distance.
    #[must_use]
    pub fn track(mut self, track: TrackId) -> Self {
        self.track = Some(track);
        self
    }

    /// Axis of the pinned translation (builder pattern).
    #[must_use]
    pub fn axis(mut self, axis: Axis) -> Self {
        self.axis = axis;
        self
    }

    /// Progress callback (builder pattern).
    #[must_use]
    pub fn on_progress(mut self, f: impl FnMut(f64) + 'static) -> Self {
        self.on_progress = Some(Box::new(f));
        self
    }

    /// Edge-crossing callback (builder pattern).
    #[must_use]
    pub fn on_toggle(mut self, f: impl FnMut(TriggerEvent) + 'static) -> Self {
        self.on_toggle = Some(Box::new(f));
        self
    }
}

/// Observable state of one binding after the latest recompute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerState {
    /// Binding id.
    pub id: TriggerId,
    /// `start <= position <= end`.
    pub active: bool,
    /// Pinned binding inside `[start, end)`.
    pub pinned: bool,
    /// Unsmoothed clamped progress.
    pub raw_progress: f64,
    /// Progress after scrub smoothing.
    pub progress: f64,
    /// Translation of the pinned content.
    pub translate: Translate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Before,
    Inside,
    After,
}

struct Entry {
    id: TriggerId,
    start: f64,
    end: f64,
    pinned: bool,
    track: Option<TrackId>,
    axis: Axis,
    scrub: Scrub,
    phase: Phase,
    pinned_now: bool,
    raw_progress: f64,
    last_emitted: f64,
    translate: Translate,
    on_progress: Option<ProgressFn>,
    on_toggle: Option<ToggleFn>,
}

impl Entry {
    fn raw_progress_at(&self, position: f64) -> f64 {
        ((position - self.start) / (self.end - self.start)).clamp(0.0, 1.0)
    }

    fn phase_at(&self, position: f64) -> Phase {
        if position < self.start {
            Phase::Before
        } else if position > self.end {
            Phase::After
        } else {
            Phase::Inside
        }
    }

    fn overlaps(&self, start: f64, end: f64) -> bool {
        self.start < end && start < self.end
    }

    fn state(&self) -> TriggerState {
        TriggerState {
            id: self.id,
            active: self.phase == Phase::Inside,
            pinned: self.pinned_now,
            raw_progress: self.raw_progress,
            progress: self.scrub.value(),
            translate: self.translate,
        }
    }

    fn toggle(&mut self, event: TriggerEvent) {
        trace!(trigger = %self.id, ?event, "trigger toggled");
        if let Some(cb) = self.on_toggle.as_mut() {
            cb(event);
        }
    }
}

fn phase_events(from: Phase, to: Phase) -> &'static [TriggerEvent] {
    use TriggerEvent::*;
    match (from, to) {
        (Phase::Before, Phase::Inside) => &[Enter],
        (Phase::Before, Phase::After) => &[Enter, Leave],
        (Phase::Inside, Phase::After) => &[Leave],
        (Phase::After, Phase::Inside) => &[EnterBack],
        (Phase::After, Phase::Before) => &[EnterBack, LeaveBack],
        (Phase::Inside, Phase::Before) => &[LeaveBack],
        _ => &[],
    }
}

/// All scroll-linked bindings of one engine.
pub struct TriggerRegistry {
    entries: Vec<Entry>,
    track_distances: HashMap<TrackId, f64>,
    next_id: u64,
    frame_delta: Duration,
    last_position: Option<f64>,
}

impl fmt::Debug for TriggerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriggerRegistry")
            .field("bindings", &self.entries.len())
            .field("track_distances", &self.track_distances)
            .field("frame_delta", &self.frame_delta)
            .field("last_position", &self.last_position)
            .finish()
    }
}

impl Default for TriggerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TriggerRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            track_distances: HashMap::new(),
            next_id: 0,
            frame_delta: DEFAULT_FRAME_DELTA,
            last_position: None,
        }
    }

    /// Frame delta used by [`recompute`](Self::recompute).
    pub fn set_frame_delta(&mut self, dt: Duration) {
        self.frame_delta = dt;
    }

    /// Record the position the page starts at, before any recompute.
    ///
    /// Bindings registered afterwards start their lag at the progress of
    /// that position instead of 0, so a restored offset is not animated in.
    pub fn seed(&mut self, position: f64) {
        if position.is_finite() {
            self.last_position = Some(position);
        }
    }

    /// Register a binding.
    ///
    /// Rejects (and logs) an empty, inverted, or non-finite range, an invalid
    /// scrub factor, a range overlapping another binding of the same track,
    /// and a pinned range overlapping any other pinned range.
    pub fn register(&mut self, binding: TriggerBinding) -> Result<TriggerId> {
        self.check_range(None, binding.start, binding.end, binding.pinned, binding.track)?;
        if !binding.scrub.is_finite() || binding.scrub < 0.0 {
            warn!(scrub = binding.scrub, "trigger rejected: invalid scrub factor");
            return Err(EngineError::InvalidScrub(binding.scrub));
        }

        let id = TriggerId(self.next_id);
        self.next_id += 1;

        let mut entry = Entry {
            id,
            start: binding.start,
            end: binding.end,
            pinned: binding.pinned,
            track: binding.track,
            axis: binding.axis,
            scrub: Scrub::new(binding.scrub, 0.0),
            phase: Phase::Before,
            pinned_now: false,
            raw_progress: 0.0,
            last_emitted: 0.0,
            translate: Translate::ZERO,
            on_progress: binding.on_progress,
            on_toggle: binding.on_toggle,
        };
        // A binding mounted mid-page starts its lag at the current progress;
        // edge events still fire on the next recompute.
        if let Some(position) = self.last_position {
            let p = entry.raw_progress_at(position);
            entry.scrub.snap_to(p);
            entry.last_emitted = p;
        }
        self.entries.push(entry);
        Ok(id)
    }

    /// Move an existing binding to `[start, end]`, keeping its callbacks.
    pub fn update_range(&mut self, id: TriggerId, start: f64, end: f64) -> Result<()> {
        let Some(entry) = self.entries.iter().find(|e| e.id == id) else {
            return Err(EngineError::UnknownTrigger(id));
        };
        let (pinned, track) = (entry.pinned, entry.track);
        self.check_range(Some(id), start, end, pinned, track)?;
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            entry.start = start;
            entry.end = end;
        }
        Ok(())
    }

    /// Remove a binding. A pinned element is released immediately.
    pub fn unregister(&mut self, id: TriggerId) -> bool {
        let Some(index) = self.entries.iter().position(|e| e.id == id) else {
            return false;
        };
        let mut entry = self.entries.remove(index);
        if entry.pinned_now {
            entry.pinned_now = false;
            entry.toggle(TriggerEvent::Unpin);
        }
        true
    }

    /// Remove every binding, releasing pinned elements. Returns the count.
    pub fn clear(&mut self) -> usize {
        let ids: Vec<TriggerId> = self.entries.iter().map(|e| e.id).collect();
        for id in &ids {
            self.unregister(*id);
        }
        self.last_position = None;
        ids.len()
    }

    /// Record the scrollable distance of a track.
    pub fn set_track_distance(&mut self, track: TrackId, distance: f64) {
        let distance = if distance.is_finite() {
            distance.max(0.0)
        } else {
            0.0
        };
        self.track_distances.insert(track, distance);
    }

    /// Scrollable distance of a track (0 when unknown).
    #[must_use]
    pub fn track_distance(&self, track: TrackId) -> f64 {
        self.track_distances.get(&track).copied().unwrap_or(0.0)
    }

    /// Recompute with the default frame delta.
    pub fn recompute(&mut self, position: f64) {
        self.recompute_with(position, self.frame_delta);
    }

    /// Recompute every binding for `position`, advancing scrub lag by `dt`.
    pub fn recompute_with(&mut self, position: f64, dt: Duration) {
        if !position.is_finite() {
            return;
        }
        self.last_position = Some(position);
        for entry in &mut self.entries {
            let raw = entry.raw_progress_at(position);
            let phase = entry.phase_at(position);
            entry.raw_progress = raw;
            entry.scrub.set_target(raw);
            entry.scrub.advance(dt);
            let p = entry.scrub.value();
            let pinned_now = entry.pinned
                && ((position >= entry.start && position < entry.end) || (p > 0.0 && p < 1.0));

            if entry.pinned_now && !pinned_now {
                entry.pinned_now = false;
                entry.toggle(TriggerEvent::Unpin);
            }
            for event in phase_events(entry.phase, phase) {
                entry.toggle(*event);
            }
            entry.phase = phase;
            if !entry.pinned_now && pinned_now {
                entry.pinned_now = true;
                entry.toggle(TriggerEvent::Pin);
            }

            entry.translate = match (entry.pinned, entry.track) {
                (true, Some(track)) => {
                    let distance = self.track_distances.get(&track).copied().unwrap_or(0.0);
                    Translate::along(entry.axis, -p * distance)
                }
                _ => Translate::ZERO,
            };

            if phase == Phase::Inside || p != entry.last_emitted {
                entry.last_emitted = p;
                if let Some(cb) = entry.on_progress.as_mut() {
                    cb(p);
                }
            }
        }
    }

    /// State of one binding.
    #[must_use]
    pub fn state(&self, id: TriggerId) -> Option<TriggerState> {
        self.entries.iter().find(|e| e.id == id).map(Entry::state)
    }

    /// States of all bindings in registration order.
    #[must_use]
    pub fn states(&self) -> Vec<TriggerState> {
        self.entries.iter().map(Entry::state).collect()
    }

    /// Number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no binding is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn check_range(
        &self,
        skip: Option<TriggerId>,
        start: f64,
        end: f64,
        pinned: bool,
        track: Option<TrackId>,
    ) -> Result<()> {
        if !start.is_finite() || !end.is_finite() || end <= start {
            warn!(start, end, "trigger rejected: empty or inverted range");
            return Err(EngineError::InvalidRange { start, end });
        }
        let conflict = self.entries.iter().find(|e| {
            Some(e.id) != skip
                && e.overlaps(start, end)
                && ((pinned && e.pinned) || (track.is_some() && e.track == track))
        });
        if let Some(existing) = conflict {
            warn!(start, end, existing = %existing.id, "trigger rejected: overlapping range");
            return Err(EngineError::OverlappingRange {
                existing: existing.id,
                start,
                end,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder() -> (Rc<RefCell<Vec<TriggerEvent>>>, impl FnMut(TriggerEvent)) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        (log, move |e| sink.borrow_mut().push(e))
    }

    #[test]
    fn pin_window_is_half_open() {
        let mut reg = TriggerRegistry::new();
        let id = reg.register(TriggerBinding::new(100.0, 300.0).pinned()).unwrap();

        reg.recompute(99.0);
        assert!(!reg.state(id).unwrap().pinned);

        reg.recompute(200.0);
        let s = reg.state(id).unwrap();
        assert!(s.pinned);
        assert!((s.progress - 0.5).abs() < 1e-9);

        reg.recompute(300.0);
        let s = reg.state(id).unwrap();
        assert!(!s.pinned);
        assert!(s.active);
        assert_eq!(s.progress, 1.0);

        reg.recompute(301.0);
        assert!(!reg.state(id).unwrap().pinned);
    }

    #[test]
    fn degenerate_ranges_are_rejected() {
        let mut reg = TriggerRegistry::new();
        assert_eq!(
            reg.register(TriggerBinding::new(300.0, 100.0)).unwrap_err(),
            EngineError::InvalidRange {
                start: 300.0,
                end: 100.0
            }
        );
        assert!(reg.register(TriggerBinding::new(5.0, 5.0)).is_err());
        assert!(reg.register(TriggerBinding::new(f64::NAN, 5.0)).is_err());
        assert!(reg.is_empty());
    }

    #[test]
    fn invalid_scrub_is_rejected() {
        let mut reg = TriggerRegistry::new();
        assert_eq!(
            reg.register(TriggerBinding::new(0.0, 1.0).scrub(-1.0)).unwrap_err(),
            EngineError::InvalidScrub(-1.0)
        );
    }

    #[test]
    fn overlapping_pins_are_rejected() {
        let mut reg = TriggerRegistry::new();
        let first = reg.register(TriggerBinding::new(0.0, 200.0).pinned()).unwrap();
        let err = reg
            .register(TriggerBinding::new(150.0, 400.0).pinned())
            .unwrap_err();
        assert!(matches!(err, EngineError::OverlappingRange { existing, .. } if existing == first));
        // Touching ranges do not overlap.
        assert!(reg.register(TriggerBinding::new(200.0, 400.0).pinned()).is_ok());
        // Unpinned decorative bindings may overlap pins.
        assert!(reg.register(TriggerBinding::new(50.0, 350.0)).is_ok());
    }

    #[test]
    fn same_track_bindings_must_be_disjoint() {
        let mut reg = TriggerRegistry::new();
        reg.register(TriggerBinding::new(0.0, 100.0).track(TrackId(1)))
            .unwrap();
        assert!(
            reg.register(TriggerBinding::new(50.0, 150.0).track(TrackId(1)))
                .is_err()
        );
        assert!(
            reg.register(TriggerBinding::new(50.0, 150.0).track(TrackId(2)))
                .is_ok()
        );
    }

    #[test]
    fn progress_callback_sees_clamped_values() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        let mut reg = TriggerRegistry::new();
        reg.register(TriggerBinding::new(100.0, 300.0).on_progress(move |p| s.borrow_mut().push(p)))
            .unwrap();

        reg.recompute(50.0);
        reg.recompute(150.0);
        reg.recompute(250.0);
        reg.recompute(900.0);
        reg.recompute(950.0);
        assert_eq!(*seen.borrow(), vec![0.25, 0.75, 1.0]);
    }

    #[test]
    fn skipped_range_emits_both_edges() {
        let (log, sink) = recorder();
        let mut reg = TriggerRegistry::new();
        reg.register(TriggerBinding::new(100.0, 300.0).pinned().on_toggle(sink))
            .unwrap();

        reg.recompute(0.0);
        reg.recompute(500.0);
        reg.recompute(0.0);
        assert_eq!(
            *log.borrow(),
            vec![
                TriggerEvent::Enter,
                TriggerEvent::Leave,
                TriggerEvent::EnterBack,
                TriggerEvent::LeaveBack
            ]
        );
    }

    #[test]
    fn pin_events_wrap_phase_events() {
        let (log, sink) = recorder();
        let mut reg = TriggerRegistry::new();
        reg.register(TriggerBinding::new(100.0, 300.0).pinned().on_toggle(sink))
            .unwrap();

        reg.recompute(150.0);
        reg.recompute(350.0);
        reg.recompute(250.0);
        reg.recompute(50.0);
        use TriggerEvent::*;
        assert_eq!(
            *log.borrow(),
            vec![Enter, Pin, Unpin, Leave, EnterBack, Pin, Unpin, LeaveBack]
        );
    }

    #[test]
    fn unregister_mid_pin_releases() {
        let (log, sink) = recorder();
        let mut reg = TriggerRegistry::new();
        let id = reg
            .register(TriggerBinding::new(100.0, 300.0).pinned().on_toggle(sink))
            .unwrap();
        reg.recompute(200.0);
        assert!(reg.unregister(id));
        assert!(!reg.unregister(id));
        assert_eq!(log.borrow().last(), Some(&TriggerEvent::Unpin));
        assert!(reg.state(id).is_none());
    }

    #[test]
    fn scrub_lags_then_settles_after_leaving() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        let mut reg = TriggerRegistry::new();
        let id = reg
            .register(
                TriggerBinding::new(0.0, 100.0)
                    .scrub(0.5)
                    .on_progress(move |p| s.borrow_mut().push(p)),
            )
            .unwrap();

        reg.recompute(100.0);
        let first = reg.state(id).unwrap().progress;
        assert!(first > 0.0 && first < 1.0);

        for _ in 0..600 {
            reg.recompute(400.0);
        }
        assert_eq!(reg.state(id).unwrap().progress, 1.0);
        assert_eq!(seen.borrow().last(), Some(&1.0));

        let count = seen.borrow().len();
        reg.recompute(400.0);
        assert_eq!(seen.borrow().len(), count);
    }

    #[test]
    fn translate_uses_current_track_distance() {
        let mut reg = TriggerRegistry::new();
        let track = TrackId(0);
        reg.set_track_distance(track, 2000.0);
        let id = reg
            .register(
                TriggerBinding::new(0.0, 2000.0)
                    .pinned()
                    .track(track)
                    .axis(Axis::Horizontal),
            )
            .unwrap();

        reg.recompute(1000.0);
        assert_eq!(reg.state(id).unwrap().translate, Translate::along(Axis::Horizontal, -1000.0));

        reg.set_track_distance(track, 3000.0);
        reg.recompute(1000.0);
        assert_eq!(reg.state(id).unwrap().translate.x, -1500.0);
    }

    #[test]
    fn update_range_rechecks_overlap() {
        let mut reg = TriggerRegistry::new();
        let a = reg.register(TriggerBinding::new(0.0, 100.0).pinned()).unwrap();
        reg.register(TriggerBinding::new(200.0, 300.0).pinned()).unwrap();
        assert!(reg.update_range(a, 0.0, 150.0).is_ok());
        assert!(reg.update_range(a, 0.0, 250.0).is_err());
        assert_eq!(
            reg.update_range(TriggerId(99), 0.0, 1.0),
            Err(EngineError::UnknownTrigger(TriggerId(99)))
        );
    }

    #[test]
    fn late_binding_starts_at_current_progress() {
        let mut reg = TriggerRegistry::new();
        reg.recompute(150.0);
        let id = reg
            .register(TriggerBinding::new(100.0, 200.0).scrub(1.0))
            .unwrap();
        assert_eq!(reg.state(id).unwrap().progress, 0.5);
    }

    #[test]
    fn scrubbed_pin_holds_until_translation_completes() {
        let (log, sink) = recorder();
        let mut reg = TriggerRegistry::new();
        let track = TrackId(0);
        reg.set_track_distance(track, 2000.0);
        let id = reg
            .register(
                TriggerBinding::new(0.0, 2000.0)
                    .pinned()
                    .track(track)
                    .scrub(1.0)
                    .on_toggle(sink),
            )
            .unwrap();

        reg.recompute(0.0);
        reg.recompute(3000.0);
        let mut released_at = None;
        for frame in 0..2000 {
            let s = reg.state(id).unwrap();
            if !s.pinned {
                released_at = Some(frame);
                assert_eq!(s.progress, 1.0);
                assert_eq!(s.translate.x, -2000.0);
                break;
            }
            assert!(s.progress < 1.0);
            reg.recompute(3000.0);
        }
        assert!(released_at.is_some_and(|f| f > 0), "{released_at:?}");
        use TriggerEvent::*;
        assert_eq!(*log.borrow(), vec![Enter, Pin, Leave, Unpin]);
    }

    #[test]
    fn scrubbed_pin_holds_while_settling_back_to_start() {
        let mut reg = TriggerRegistry::new();
        reg.seed(200.0);
        let id = reg
            .register(TriggerBinding::new(100.0, 300.0).pinned().scrub(0.5))
            .unwrap();
        reg.recompute(200.0);
        reg.recompute(0.0);
        let s = reg.state(id).unwrap();
        assert!(s.pinned);
        assert!(s.progress > 0.0 && s.progress < 1.0);
        for _ in 0..2000 {
            reg.recompute(0.0);
        }
        let s = reg.state(id).unwrap();
        assert!(!s.pinned);
        assert_eq!(s.progress, 0.0);
    }

    #[test]
    fn seeded_registry_snaps_new_bindings() {
        let mut reg = TriggerRegistry::new();
        reg.seed(1500.0);
        let id = reg
            .register(TriggerBinding::new(500.0, 2500.0).pinned().scrub(1.0))
            .unwrap();
        reg.recompute(1500.0);
        let s = reg.state(id).unwrap();
        assert!(s.pinned);
        assert_eq!(s.progress, 0.5);

        reg.seed(f64::NAN);
        let late = reg
            .register(TriggerBinding::new(1000.0, 2000.0).scrub(1.0))
            .unwrap();
        assert_eq!(reg.state(late).unwrap().progress, 0.5);
    }

    #[test]
    fn clear_releases_everything() {
        let (log, sink) = recorder();
        let mut reg = TriggerRegistry::new();
        reg.register(TriggerBinding::new(0.0, 100.0).pinned().on_toggle(sink))
            .unwrap();
        reg.register(TriggerBinding::new(0.0, 50.0)).unwrap();
        reg.recompute(10.0);
        assert_eq!(reg.clear(), 2);
        assert!(reg.is_empty());
        assert_eq!(log.borrow().last(), Some(&TriggerEvent::Unpin));
    }
}
