#![forbid(unsafe_code)]

//! Tracks, layout snapshots, and the layout-provider seam.
//!
//! A *track* is an ordered run of panels that scrolls as one unit, usually
//! horizontally while the page is pinned. Its scrollable distance is
//!
//! ```text
//! total_distance = sum(panel extents along the track axis) - viewport extent
//! ```
//!
//! and that distance is also the length of the pin range in virtual scroll
//! units: one pixel of vertical scroll moves the track one pixel sideways.
//!
//! The engine never measures a renderer directly. It asks a
//! [`LayoutProvider`] for a [`LayoutSnapshot`], which makes every distance
//! computation testable with synthetic numbers ([`SyntheticLayout`]).

use std::cell::RefCell;
use std::fmt;

use crate::geometry::{Axis, ViewportRect};
use crate::section::SectionBoundaries;

/// Stable identifier of a track on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackId(pub u32);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "track#{}", self.0)
    }
}

/// Declared and measured geometry of one track.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackLayout {
    /// Track identity.
    pub id: TrackId,
    /// Axis the panels are laid out on.
    pub axis: Axis,
    /// Virtual scroll offset at which the track pins.
    pub start: f64,
    /// Measured panel extents along `axis`, in order.
    pub panel_extents: Vec<f64>,
    /// Whether the track pins while its panels scroll past.
    pub pinned: bool,
    /// Per-track scrub lag in seconds (`None` uses the engine default).
    pub scrub: Option<f64>,
    /// Custom section thresholds (`None` divides uniformly per panel).
    pub thresholds: Option<Vec<f64>>,
}

impl TrackLayout {
    /// A pinned horizontal track starting at `start`.
    #[must_use]
    pub fn horizontal(id: TrackId, start: f64, panel_extents: Vec<f64>) -> Self {
        Self {
            id,
            axis: Axis::Horizontal,
            start,
            panel_extents,
            pinned: true,
            scrub: None,
            thresholds: None,
        }
    }

    /// Set a per-track scrub lag (builder pattern).
    #[must_use]
    pub fn with_scrub(mut self, scrub: f64) -> Self {
        self.scrub = Some(scrub);
        self
    }

    /// Use custom section thresholds (builder pattern).
    #[must_use]
    pub fn with_thresholds(mut self, thresholds: Vec<f64>) -> Self {
        self.thresholds = Some(thresholds);
        self
    }

    /// Disable pinning (builder pattern).
    #[must_use]
    pub fn unpinned(mut self) -> Self {
        self.pinned = false;
        self
    }

    /// Sum of panel extents along the track axis.
    #[must_use]
    pub fn content_extent(&self) -> f64 {
        self.panel_extents.iter().sum()
    }

    /// Scrollable distance: content extent minus one viewport, never negative.
    #[must_use]
    pub fn total_distance(&self, viewport: &ViewportRect) -> f64 {
        (self.content_extent() - viewport.extent(self.axis)).max(0.0)
    }

    /// Virtual scroll offset at which the track releases.
    #[must_use]
    pub fn end(&self, viewport: &ViewportRect) -> f64 {
        self.start + self.total_distance(viewport)
    }

    /// Number of panels.
    #[must_use]
    pub fn panel_count(&self) -> usize {
        self.panel_extents.len()
    }

    /// Section boundaries for the mapper.
    #[must_use]
    pub fn boundaries(&self) -> SectionBoundaries {
        match &self.thresholds {
            Some(thresholds) => SectionBoundaries::Thresholds(thresholds.clone()),
            None => SectionBoundaries::Uniform(self.panel_count()),
        }
    }

    /// Progress of `position` through the track, clamped to `[0, 1]`.
    ///
    /// A track with no scrollable distance reports 0 before its start and 1
    /// from its start onward.
    #[must_use]
    pub fn progress_at(&self, position: f64, viewport: &ViewportRect) -> f64 {
        let distance = self.total_distance(viewport);
        if distance <= 0.0 {
            return if position >= self.start { 1.0 } else { 0.0 };
        }
        ((position - self.start) / distance).clamp(0.0, 1.0)
    }
}

/// Why a snapshot cannot be used yet.
#[derive(Debug, Clone, PartialEq)]
pub enum MeasureIssue {
    /// The viewport has zero or non-finite size.
    ViewportUnmeasured,
    /// A track has no panels.
    EmptyTrack(TrackId),
    /// A panel has zero, negative, or non-finite extent.
    UnsettledPanel { track: TrackId, index: usize },
}

impl fmt::Display for MeasureIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ViewportUnmeasured => write!(f, "viewport has no measurable size"),
            Self::EmptyTrack(track) => write!(f, "{track} has no panels"),
            Self::UnsettledPanel { track, index } => {
                write!(f, "{track} panel {index} has no settled extent")
            }
        }
    }
}

/// A complete measurement of the page at one instant.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutSnapshot {
    /// Visible viewport.
    pub viewport: ViewportRect,
    /// Full scrollable document extent on the virtual axis (including pin spacing).
    pub document_extent: f64,
    /// Every track on the page, in document order.
    pub tracks: Vec<TrackLayout>,
}

impl LayoutSnapshot {
    /// Maximum virtual scroll offset.
    ///
    /// Never smaller than the end of the last track, so a document extent
    /// that forgot pin spacing still lets every track finish.
    #[must_use]
    pub fn scroll_limit(&self) -> f64 {
        let document = (self.document_extent - self.viewport.height).max(0.0);
        self.tracks
            .iter()
            .map(|t| t.end(&self.viewport))
            .fold(document, f64::max)
    }

    /// Look up a track.
    #[must_use]
    pub fn track(&self, id: TrackId) -> Option<&TrackLayout> {
        self.tracks.iter().find(|t| t.id == id)
    }

    /// Verify every measurement has settled.
    pub fn check(&self) -> Result<(), MeasureIssue> {
        if !self.viewport.is_measurable() {
            return Err(MeasureIssue::ViewportUnmeasured);
        }
        for track in &self.tracks {
            if track.panel_extents.is_empty() {
                return Err(MeasureIssue::EmptyTrack(track.id));
            }
            if let Some(index) = track
                .panel_extents
                .iter()
                .position(|e| !e.is_finite() || *e <= 0.0)
            {
                return Err(MeasureIssue::UnsettledPanel {
                    track: track.id,
                    index,
                });
            }
        }
        Ok(())
    }
}

/// Source of layout measurements.
///
/// Implemented by the host over its real rendering surface; the engine calls
/// `measure()` on setup and after each debounced resize.
pub trait LayoutProvider {
    /// Measure the page now.
    fn measure(&self) -> LayoutSnapshot;
}

/// A [`LayoutProvider`] backed by caller-supplied numbers.
///
/// Interior mutability lets tests change panel widths between measurements
/// while the engine holds a shared reference.
#[derive(Debug, Default)]
pub struct SyntheticLayout {
    snapshot: RefCell<LayoutSnapshot>,
}

impl SyntheticLayout {
    /// Wrap an initial snapshot.
    #[must_use]
    pub fn new(snapshot: LayoutSnapshot) -> Self {
        Self {
            snapshot: RefCell::new(snapshot),
        }
    }

    /// Replace the viewport.
    pub fn set_viewport(&self, viewport: ViewportRect) {
        self.snapshot.borrow_mut().viewport = viewport;
    }

    /// Replace the document extent.
    pub fn set_document_extent(&self, extent: f64) {
        self.snapshot.borrow_mut().document_extent = extent;
    }

    /// Replace one track's panel extents. Returns `false` for an unknown track.
    pub fn set_panel_extents(&self, id: TrackId, extents: Vec<f64>) -> bool {
        let mut snapshot = self.snapshot.borrow_mut();
        match snapshot.tracks.iter_mut().find(|t| t.id == id) {
            Some(track) => {
                track.panel_extents = extents;
                true
            }
            None => false,
        }
    }
}

impl LayoutProvider for SyntheticLayout {
    fn measure(&self) -> LayoutSnapshot {
        self.snapshot.borrow().clone()
    }
}
