#![forbid(unsafe_code)]

//! The single frame clock of a page.
//!
//! Hosts schedule animation frames on their own (a browser's
//! `requestAnimationFrame`, a test loop). Each scheduled callback holds a
//! [`ClockHandle`] and presents it with every frame. The [`FrameClock`]
//! admits a frame only for the handle of its current subscription, so a
//! callback left over from a torn-down engine can fire without effect.
//!
//! # Invariants
//!
//! 1. At most one subscription is live at any time.
//! 2. [`subscribe`](FrameClock::subscribe) cancels the previous subscription
//!    before returning the new handle.
//! 3. Frame timestamps must increase; a repeated or earlier timestamp is
//!    refused.

use std::time::Duration;

use tracing::debug;

use crate::cancellation::{CancellationSource, CancellationToken};

/// Host-held proof of a clock subscription.
#[derive(Debug, Clone)]
pub struct ClockHandle {
    generation: u64,
    token: CancellationToken,
}

impl ClockHandle {
    /// Subscription generation (increments per `subscribe`).
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the subscription was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

#[derive(Debug)]
struct Active {
    generation: u64,
    source: CancellationSource,
    last_ts: Option<f64>,
}

/// Owner of the page's frame subscription.
#[derive(Debug)]
pub struct FrameClock {
    active: Option<Active>,
    generation: u64,
    fallback_delta: Duration,
}

impl FrameClock {
    /// Create a clock; `fallback_delta` is reported for the first frame.
    #[must_use]
    pub fn new(fallback_delta: Duration) -> Self {
        Self {
            active: None,
            generation: 0,
            fallback_delta,
        }
    }

    /// Start a new subscription, cancelling the current one first.
    pub fn subscribe(&mut self) -> ClockHandle {
        if let Some(previous) = self.active.take() {
            previous.source.cancel();
            debug!(
                generation = previous.generation,
                "clock subscription replaced"
            );
        }
        self.generation += 1;
        let source = CancellationSource::new();
        let handle = ClockHandle {
            generation: self.generation,
            token: source.token(),
        };
        self.active = Some(Active {
            generation: self.generation,
            source,
            last_ts: None,
        });
        handle
    }

    /// Cancel the live subscription. Returns whether one existed.
    pub fn cancel(&mut self) -> bool {
        match self.active.take() {
            Some(active) => {
                active.source.cancel();
                true
            }
            None => false,
        }
    }

    /// Whether a subscription is live.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Whether `handle` belongs to the live subscription.
    #[must_use]
    pub fn admits(&self, handle: &ClockHandle) -> bool {
        !handle.is_cancelled()
            && self
                .active
                .as_ref()
                .is_some_and(|a| a.generation == handle.generation)
    }

    /// Accept a frame at `timestamp_ms` for `handle`.
    ///
    /// Returns the delta since the previous admitted frame (the fallback
    /// delta for the first one), or `None` when the handle is stale or the
    /// timestamp does not advance.
    pub fn tick(&mut self, handle: &ClockHandle, timestamp_ms: f64) -> Option<Duration> {
        if !self.admits(handle) || !timestamp_ms.is_finite() {
            return None;
        }
        let fallback = self.fallback_delta;
        let active = self.active.as_mut()?;
        let dt = match active.last_ts {
            Some(last) if timestamp_ms <= last => return None,
            Some(last) => Duration::from_micros(((timestamp_ms - last) * 1000.0).round() as u64),
            None => fallback,
        };
        active.last_ts = Some(timestamp_ms);
        Some(dt)
    }
}
