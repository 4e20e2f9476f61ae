#![forbid(unsafe_code)]

//! Progress-to-section mapping.
//!
//! Turns a continuous progress value into the discrete index of the active
//! panel. The mapping is a pure function of the current progress: there is
//! no history, so scrolling backward simply yields smaller indices again.
//!
//! Two boundary models are supported:
//!
//! - [`SectionBoundaries::Uniform`]: `clamp(floor(p * n), 0, n - 1)`.
//! - [`SectionBoundaries::Thresholds`]: an ascending list of progress values;
//!   the index is the number of thresholds `<= p`. `[0.5]` gives two sections
//!   split at the midpoint, which is how a two-phase panel is expressed.

use std::fmt;

/// Active index for `progress` over `panel_count` uniform panels.
///
/// Never out of bounds: progress 1.0 (and anything above) maps to the last
/// panel, NaN and negative progress map to 0, and zero panels yield 0.
#[must_use]
pub fn compute_active_index(progress: f64, panel_count: usize) -> usize {
    if panel_count == 0 || progress.is_nan() || progress <= 0.0 {
        return 0;
    }
    let raw = (progress * panel_count as f64).floor();
    if raw >= panel_count as f64 {
        panel_count - 1
    } else {
        raw as usize
    }
}

/// How progress is divided into sections.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionBoundaries {
    /// `n` equal sections.
    Uniform(usize),
    /// Ascending thresholds in `(0, 1]`; `len + 1` sections.
    Thresholds(Vec<f64>),
}

/// Why a threshold list was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum ThresholdError {
    /// A threshold is outside `(0, 1]` or not finite.
    OutOfRange { index: usize, value: f64 },
    /// Thresholds are not strictly ascending.
    NotAscending { index: usize },
}

impl fmt::Display for ThresholdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange { index, value } => {
                write!(f, "threshold {index} = {value} is outside (0, 1]")
            }
            Self::NotAscending { index } => {
                write!(f, "threshold {index} is not greater than its predecessor")
            }
        }
    }
}

impl std::error::Error for ThresholdError {}

impl SectionBoundaries {
    /// Number of sections.
    #[must_use]
    pub fn section_count(&self) -> usize {
        match self {
            Self::Uniform(n) => *n,
            Self::Thresholds(t) => t.len() + 1,
        }
    }

    /// Active index for `progress`.
    #[must_use]
    pub fn active_index(&self, progress: f64) -> usize {
        match self {
            Self::Uniform(n) => compute_active_index(progress, *n),
            Self::Thresholds(thresholds) => {
                if progress.is_nan() {
                    return 0;
                }
                thresholds.iter().take_while(|t| progress >= **t).count()
            }
        }
    }

    /// Validate a threshold list; uniform boundaries are always valid.
    pub fn validate(&self) -> Result<(), ThresholdError> {
        let Self::Thresholds(thresholds) = self else {
            return Ok(());
        };
        for (index, value) in thresholds.iter().copied().enumerate() {
            if !value.is_finite() || value <= 0.0 || value > 1.0 {
                return Err(ThresholdError::OutOfRange { index, value });
            }
            if index > 0 && value <= thresholds[index - 1] {
                return Err(ThresholdError::NotAscending { index });
            }
        }
        Ok(())
    }
}

/// Discrete section state of one track.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SectionProgressState {
    /// Index of the active section.
    pub active_index: usize,
    /// Progress through the track in `[0, 1]`.
    pub track_progress: f64,
}

impl SectionProgressState {
    /// Derive the state for `progress` under `boundaries`.
    #[must_use]
    pub fn derive(boundaries: &SectionBoundaries, progress: f64) -> Self {
        let track_progress = if progress.is_nan() {
            0.0
        } else {
            progress.clamp(0.0, 1.0)
        };
        Self {
            active_index: boundaries.active_index(track_progress),
            track_progress,
        }
    }
}
