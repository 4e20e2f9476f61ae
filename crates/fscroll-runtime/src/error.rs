#![forbid(unsafe_code)]

//! Engine error model.
//!
//! # Design Principles
//!
//! 1. **Reject, log, continue**: configuration errors are returned from the
//!    call that introduced them and logged once; the page keeps scrolling with
//!    the offending binding skipped.
//! 2. **Lifecycle races are not errors**: double setup and double teardown
//!    are reported through outcome enums, never through [`EngineError`].
//! 3. **Measurement errors defer**: an unsettled layout keeps setup pending
//!    until the next ready or resize event; nothing is retried on a timer.

use std::fmt;

use fscroll_core::section::ThresholdError;
use fscroll_core::track::{MeasureIssue, TrackId};

use crate::registry::TriggerId;

/// Errors surfaced by the scroll engine.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Trigger range is empty, inverted, or not finite.
    InvalidRange { start: f64, end: f64 },
    /// Trigger range overlaps a binding it must stay disjoint from.
    OverlappingRange {
        existing: TriggerId,
        start: f64,
        end: f64,
    },
    /// Scrub factor is negative or not finite.
    InvalidScrub(f64),
    /// A track's section thresholds are malformed.
    InvalidThresholds {
        track: TrackId,
        reason: ThresholdError,
    },
    /// Layout has not settled yet.
    Measurement(MeasureIssue),
    /// No binding with this id is registered.
    UnknownTrigger(TriggerId),
    /// The operation targeted an engine that was already torn down.
    TornDown,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRange { start, end } => {
                write!(f, "trigger range [{start}, {end}] is empty or inverted")
            }
            Self::OverlappingRange {
                existing,
                start,
                end,
            } => write!(f, "trigger range [{start}, {end}] overlaps {existing}"),
            Self::InvalidScrub(factor) => write!(f, "scrub factor {factor} is invalid"),
            Self::InvalidThresholds { track, reason } => {
                write!(f, "{track} section thresholds rejected: {reason}")
            }
            Self::Measurement(issue) => write!(f, "layout not settled: {issue}"),
            Self::UnknownTrigger(id) => write!(f, "{id} is not registered"),
            Self::TornDown => write!(f, "engine already torn down"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<MeasureIssue> for EngineError {
    fn from(issue: MeasureIssue) -> Self {
        Self::Measurement(issue)
    }
}

/// Standard result type for engine APIs.
pub type Result<T> = std::result::Result<T, EngineError>;
