#![forbid(unsafe_code)]

//! Inertial scroll driver.
//!
//! The driver owns the virtual scroll position. Raw gestures never move the
//! position directly: they move a *target*, and an eased [`ScrollTween`]
//! carries the position toward it over the configured duration. The host's
//! frame clock advances the tween through [`InertialScrollDriver::step`].
//!
//! # Invariants
//!
//! 1. `step(ts)` with `ts` not greater than the previous timestamp is a no-op.
//! 2. The position only changes inside `step`, or through an explicit
//!    immediate jump (`scroll_to` with `immediate`, or a shrinking limit).
//! 3. Target and position stay within `[0, limit]`.
//! 4. Direction and velocity are derived from motion, never set by callers.
//! 5. After `destroy()` every call is a no-op and no listener runs again.
//!
//! # Failure Modes
//!
//! - Non-positive or non-finite duration: replaced by the default, logged.
//! - Easing that leaves `[0, 1]` or decreases: replaced by `expo_out`.
//! - Non-finite deltas or offsets: ignored.

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use fscroll_core::animation::{Animation, EasingFn, ScrollTween, expo_out, sanitize_easing};
use fscroll_core::geometry::Axis;
use fscroll_core::input::InputSource;
use tracing::{trace, warn};

const DEFAULT_DURATION: Duration = Duration::from_millis(1200);

/// Construction parameters of an [`InertialScrollDriver`].
#[derive(Clone, Copy)]
pub struct DriverConfig {
    /// Duration of one eased tween.
    pub duration: Duration,
    /// Easing applied to the tween's elapsed fraction.
    pub easing: EasingFn,
    /// Multiplier for wheel deltas.
    pub wheel_gain: f64,
    /// Multiplier for touch deltas.
    pub touch_gain: f64,
    /// Axis of the virtual position.
    pub axis: Axis,
}

impl fmt::Debug for DriverConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverConfig")
            .field("duration", &self.duration)
            .field("wheel_gain", &self.wheel_gain)
            .field("touch_gain", &self.touch_gain)
            .field("axis", &self.axis)
            .finish_non_exhaustive()
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            duration: DEFAULT_DURATION,
            easing: expo_out,
            wheel_gain: 1.0,
            touch_gain: 1.0,
            axis: Axis::Vertical,
        }
    }
}

fn sane_gain(gain: f64, name: &'static str) -> f64 {
    if gain.is_finite() && gain > 0.0 {
        gain
    } else {
        warn!(gain, name, "gesture gain must be positive; using 1.0");
        1.0
    }
}

impl DriverConfig {
    /// Repair invalid fields, logging each replacement.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        if self.duration.is_zero() {
            warn!(
                default_ms = DEFAULT_DURATION.as_millis() as u64,
                "driver duration must be positive; using default"
            );
            self.duration = DEFAULT_DURATION;
        }
        self.easing = sanitize_easing(self.easing);
        self.wheel_gain = sane_gain(self.wheel_gain, "wheel_gain");
        self.touch_gain = sane_gain(self.touch_gain, "touch_gain");
        self
    }

    fn gain(&self, source: InputSource) -> f64 {
        match source {
            InputSource::Wheel => self.wheel_gain,
            InputSource::Touch => self.touch_gain,
        }
    }
}

/// Direction of the most recent motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Position increasing.
    Forward,
    /// Position decreasing.
    Backward,
    /// At rest.
    #[default]
    Idle,
}

/// Snapshot of the driver's virtual scroll state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VirtualScrollState {
    /// Current smoothed offset.
    pub position: f64,
    /// Units per second over the last step.
    pub velocity: f64,
    /// Offset the tween is heading to.
    pub target: f64,
    /// Derived from the sign of the last motion.
    pub direction: Direction,
}

/// Payload delivered to scroll listeners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollEvent {
    /// Current smoothed offset.
    pub position: f64,
    /// Units per second.
    pub velocity: f64,
    /// Direction of motion.
    pub direction: Direction,
    /// `position / limit` in `[0, 1]`.
    pub progress: f64,
    /// Current scroll limit.
    pub limit: f64,
    /// Host timestamp of the frame that produced the event.
    pub timestamp_ms: f64,
}

/// A gesture already resolved to the driver's axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureDelta {
    /// Signed delta in virtual scroll units before gain.
    pub amount: f64,
    /// Origin, selects the gain.
    pub source: InputSource,
}

/// Options for [`InertialScrollDriver::scroll_to`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollToOptions {
    /// Jump without easing.
    pub immediate: bool,
    /// Override the configured tween duration.
    pub duration: Option<Duration>,
}

impl ScrollToOptions {
    /// Jump without easing.
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            immediate: true,
            duration: None,
        }
    }

    /// Ease over `duration`.
    #[must_use]
    pub fn over(duration: Duration) -> Self {
        Self {
            immediate: false,
            duration: Some(duration),
        }
    }
}

/// Handle returned by [`InertialScrollDriver::on_scroll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type ScrollListener = Rc<dyn Fn(&ScrollEvent)>;

/// Smooths gestures into a continuous virtual scroll position.
///
/// Listeners run synchronously from `step`/`scroll_to` while the driver is
/// mutably borrowed; they must not call back into the driver.
pub struct InertialScrollDriver {
    config: DriverConfig,
    state: VirtualScrollState,
    tween: Option<ScrollTween>,
    limit: f64,
    stopped: bool,
    destroyed: bool,
    last_ts: Option<f64>,
    listeners: Vec<(ListenerId, ScrollListener)>,
    next_listener: u64,
}

impl fmt::Debug for InertialScrollDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InertialScrollDriver")
            .field("state", &self.state)
            .field("limit", &self.limit)
            .field("stopped", &self.stopped)
            .field("destroyed", &self.destroyed)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

fn sane_limit(limit: f64) -> f64 {
    if limit.is_finite() { limit.max(0.0) } else { 0.0 }
}

impl InertialScrollDriver {
    /// Create a driver at offset 0 scrolling within `[0, limit]`.
    #[must_use]
    pub fn new(config: DriverConfig, limit: f64) -> Self {
        Self {
            config: config.sanitized(),
            state: VirtualScrollState::default(),
            tween: None,
            limit: sane_limit(limit),
            stopped: false,
            destroyed: false,
            last_ts: None,
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    /// Effective (sanitized) configuration.
    #[must_use]
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Advance the tween to host time `timestamp_ms`.
    ///
    /// Returns `true` when the position changed and listeners were notified.
    pub fn step(&mut self, timestamp_ms: f64) -> bool {
        if self.destroyed || !timestamp_ms.is_finite() {
            return false;
        }
        let dt_ms = match self.last_ts {
            Some(last) if timestamp_ms <= last => return false,
            Some(last) => timestamp_ms - last,
            None => 0.0,
        };
        self.last_ts = Some(timestamp_ms);

        let Some(tween) = self.tween.as_mut() else {
            self.state.velocity = 0.0;
            self.state.direction = Direction::Idle;
            return false;
        };
        let previous = self.state.position;
        tween.tick(Duration::try_from_secs_f64(dt_ms / 1000.0).unwrap_or(Duration::MAX));
        self.state.position = tween.position();
        if tween.is_complete() {
            self.tween = None;
        }

        let moved = self.state.position - previous;
        self.state.velocity = if dt_ms > 0.0 {
            moved / (dt_ms / 1000.0)
        } else {
            0.0
        };
        self.state.direction = if moved > 0.0 {
            Direction::Forward
        } else if moved < 0.0 {
            Direction::Backward
        } else if self.tween.is_none() {
            Direction::Idle
        } else {
            self.state.direction
        };

        if moved == 0.0 {
            return false;
        }
        trace!(
            position = self.state.position,
            velocity = self.state.velocity,
            "driver stepped"
        );
        self.emit();
        true
    }

    /// Apply a gesture delta. Returns whether the target moved.
    pub fn apply_gesture(&mut self, delta: GestureDelta) -> bool {
        if self.destroyed || self.stopped || !delta.amount.is_finite() {
            return false;
        }
        let scaled = delta.amount * self.config.gain(delta.source);
        let target = (self.state.target + scaled).clamp(0.0, self.limit);
        if target == self.state.target {
            return false;
        }
        self.animate_to(target, self.config.duration);
        true
    }

    /// Navigate to `offset`, clamped to `[0, limit]`.
    ///
    /// Programmatic navigation works while gestures are stopped. Returns
    /// `false` for a destroyed driver or a non-finite offset.
    pub fn scroll_to(&mut self, offset: f64, options: ScrollToOptions) -> bool {
        if self.destroyed {
            return false;
        }
        if !offset.is_finite() {
            warn!(offset, "scroll_to ignored non-finite offset");
            return false;
        }
        let target = offset.clamp(0.0, self.limit);
        if options.immediate {
            self.jump(target);
        } else {
            self.animate_to(target, options.duration.unwrap_or(self.config.duration));
        }
        true
    }

    /// Change the scroll limit.
    ///
    /// A limit below the current position jumps to the new limit; a limit
    /// below the target retargets the tween.
    pub fn set_limit(&mut self, limit: f64) {
        if self.destroyed {
            return;
        }
        self.limit = sane_limit(limit);
        if self.state.position > self.limit {
            self.jump(self.limit);
        } else if self.state.target > self.limit {
            self.animate_to(self.limit, self.config.duration);
        }
    }

    /// Current scroll limit.
    #[must_use]
    pub fn limit(&self) -> f64 {
        self.limit
    }

    /// Suspend gesture input and halt any tween in place.
    pub fn stop(&mut self) {
        self.stopped = true;
        self.tween = None;
        self.state.target = self.state.position;
        self.state.velocity = 0.0;
        self.state.direction = Direction::Idle;
    }

    /// Resume gesture input.
    pub fn start(&mut self) {
        self.stopped = false;
    }

    /// Whether gesture input is suspended.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Current virtual offset.
    #[must_use]
    pub fn current_position(&self) -> f64 {
        self.state.position
    }

    /// Full state snapshot.
    #[must_use]
    pub fn state(&self) -> VirtualScrollState {
        self.state
    }

    /// `position / limit` in `[0, 1]`; 0 when nothing can scroll.
    #[must_use]
    pub fn progress(&self) -> f64 {
        if self.limit <= 0.0 {
            0.0
        } else {
            (self.state.position / self.limit).clamp(0.0, 1.0)
        }
    }

    /// Whether a tween is in flight.
    #[must_use]
    pub fn is_scrolling(&self) -> bool {
        self.tween.is_some()
    }

    /// Register a scroll listener.
    pub fn on_scroll(&mut self, listener: impl Fn(&ScrollEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        if !self.destroyed {
            self.listeners.push((id, Rc::new(listener)));
        }
        id
    }

    /// Remove a scroll listener. Returns whether it was registered.
    pub fn off(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    /// Release listeners and stop all motion. Idempotent; returns whether
    /// this call did the disposal.
    pub fn destroy(&mut self) -> bool {
        if self.destroyed {
            return false;
        }
        self.destroyed = true;
        self.listeners.clear();
        self.tween = None;
        self.state.velocity = 0.0;
        self.state.direction = Direction::Idle;
        true
    }

    /// Whether `destroy` has run.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    fn animate_to(&mut self, target: f64, duration: Duration) {
        let duration = if duration.is_zero() {
            self.config.duration
        } else {
            duration
        };
        match self.tween.as_mut() {
            Some(tween) => tween.retarget(target, duration),
            None => {
                self.tween = Some(
                    ScrollTween::new(self.state.position, target, duration)
                        .easing(self.config.easing),
                );
            }
        }
        self.state.target = target;
    }

    fn jump(&mut self, target: f64) {
        self.tween = None;
        let changed = self.state.position != target;
        self.state.position = target;
        self.state.target = target;
        self.state.velocity = 0.0;
        self.state.direction = Direction::Idle;
        if changed {
            self.emit();
        }
    }

    fn emit(&self) {
        if self.listeners.is_empty() {
            return;
        }
        let event = ScrollEvent {
            position: self.state.position,
            velocity: self.state.velocity,
            direction: self.state.direction,
            progress: self.progress(),
            limit: self.limit,
            timestamp_ms: self.last_ts.unwrap_or(0.0),
        };
        let listeners: Vec<ScrollListener> =
            self.listeners.iter().map(|(_, l)| Rc::clone(l)).collect();
        for listener in listeners {
            listener(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn driver(limit: f64) -> InertialScrollDriver {
        InertialScrollDriver::new(DriverConfig::default(), limit)
    }

    fn wheel(amount: f64) -> GestureDelta {
        GestureDelta {
            amount,
            source: InputSource::Wheel,
        }
    }

    fn run(d: &mut InertialScrollDriver, from_ms: f64, to_ms: f64) -> f64 {
        let mut ts = from_ms;
        while ts <= to_ms {
            d.step(ts);
            ts += 16.0;
        }
        ts
    }

    #[test]
    fn non_increasing_timestamps_are_noops() {
        let mut d = driver(1000.0);
        d.step(0.0);
        d.apply_gesture(wheel(100.0));
        assert!(d.step(16.0));
        let after = d.state();
        assert!(!d.step(16.0));
        assert!(!d.step(10.0));
        assert_eq!(d.state(), after);
    }

    #[test]
    fn huge_frame_gap_completes_the_tween() {
        let mut d = driver(1000.0);
        d.step(0.0);
        d.scroll_to(500.0, ScrollToOptions::default());
        assert!(d.step(1e30));
        assert_eq!(d.current_position(), 500.0);
        assert!(!d.is_scrolling());
    }

    #[test]
    fn tween_settles_on_target() {
        let mut d = driver(1000.0);
        d.step(0.0);
        d.apply_gesture(wheel(300.0));
        assert!(d.is_scrolling());
        run(&mut d, 16.0, 1300.0);
        assert_eq!(d.current_position(), 300.0);
        assert!(!d.is_scrolling());
        assert_eq!(d.state().direction, Direction::Idle);
    }

    #[test]
    fn motion_is_smoothed_and_forward() {
        let mut d = driver(1000.0);
        d.step(0.0);
        d.apply_gesture(wheel(300.0));
        d.step(16.0);
        let s = d.state();
        assert!(s.position > 0.0 && s.position < 300.0);
        assert!(s.velocity > 0.0);
        assert_eq!(s.direction, Direction::Forward);
        assert_eq!(s.target, 300.0);
    }

    #[test]
    fn immediate_scroll_bypasses_easing() {
        let mut d = driver(1000.0);
        assert!(d.scroll_to(420.0, ScrollToOptions::immediate()));
        assert_eq!(d.current_position(), 420.0);
        assert!(!d.is_scrolling());
    }

    #[test]
    fn targets_clamp_to_limit() {
        let mut d = driver(500.0);
        d.apply_gesture(wheel(10_000.0));
        assert_eq!(d.state().target, 500.0);
        assert!(!d.apply_gesture(wheel(1.0)));
        d.scroll_to(-50.0, ScrollToOptions::immediate());
        assert_eq!(d.current_position(), 0.0);
    }

    #[test]
    fn gains_scale_by_source() {
        let config = DriverConfig {
            touch_gain: 2.0,
            ..DriverConfig::default()
        };
        let mut d = InertialScrollDriver::new(config, 1000.0);
        d.apply_gesture(GestureDelta {
            amount: 50.0,
            source: InputSource::Touch,
        });
        assert_eq!(d.state().target, 100.0);
    }

    #[test]
    fn retarget_is_continuous() {
        let mut d = driver(2000.0);
        d.step(0.0);
        d.apply_gesture(wheel(400.0));
        d.step(16.0);
        d.step(32.0);
        let before = d.current_position();
        d.apply_gesture(wheel(400.0));
        assert_eq!(d.current_position(), before);
        assert_eq!(d.state().target, 800.0);
    }

    #[test]
    fn duration_override_controls_settle_time() {
        let mut d = driver(1000.0);
        d.step(0.0);
        d.scroll_to(200.0, ScrollToOptions::over(Duration::from_millis(100)));
        run(&mut d, 16.0, 120.0);
        assert_eq!(d.current_position(), 200.0);
    }

    #[test]
    fn stop_blocks_gestures_only() {
        let mut d = driver(1000.0);
        d.stop();
        assert!(!d.apply_gesture(wheel(100.0)));
        assert!(d.scroll_to(100.0, ScrollToOptions::immediate()));
        d.start();
        assert!(d.apply_gesture(wheel(100.0)));
    }

    #[test]
    fn shrinking_limit_clamps_position() {
        let mut d = driver(1000.0);
        d.scroll_to(900.0, ScrollToOptions::immediate());
        d.set_limit(600.0);
        assert_eq!(d.current_position(), 600.0);
        assert_eq!(d.progress(), 1.0);
    }

    #[test]
    fn listeners_receive_events_until_off() {
        let mut d = driver(1000.0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        let id = d.on_scroll(move |e| s.borrow_mut().push(e.position));
        d.scroll_to(250.0, ScrollToOptions::immediate());
        assert!(d.off(id));
        assert!(!d.off(id));
        d.scroll_to(500.0, ScrollToOptions::immediate());
        assert_eq!(*seen.borrow(), vec![250.0]);
    }

    #[test]
    fn destroy_is_idempotent_and_silences() {
        let mut d = driver(1000.0);
        let calls = Rc::new(RefCell::new(0));
        let c = Rc::clone(&calls);
        d.on_scroll(move |_| *c.borrow_mut() += 1);
        assert!(d.destroy());
        assert!(!d.destroy());
        assert!(!d.scroll_to(10.0, ScrollToOptions::immediate()));
        assert!(!d.step(100.0));
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn invalid_config_is_repaired() {
        fn bad(t: f64) -> f64 {
            1.0 - t
        }
        let d = InertialScrollDriver::new(
            DriverConfig {
                duration: Duration::ZERO,
                easing: bad,
                wheel_gain: f64::NAN,
                ..DriverConfig::default()
            },
            100.0,
        );
        assert_eq!(d.config().duration, DEFAULT_DURATION);
        assert_eq!((d.config().easing)(1.0), 1.0);
        assert_eq!(d.config().wheel_gain, 1.0);
    }

    #[test]
    fn non_finite_input_is_ignored() {
        let mut d = driver(1000.0);
        assert!(!d.apply_gesture(wheel(f64::NAN)));
        assert!(!d.scroll_to(f64::INFINITY, ScrollToOptions::default()));
        assert_eq!(d.state(), VirtualScrollState::default());
    }
}
