#![forbid(unsafe_code)]

//! Progress-to-section mapper.
//!
//! Holds one track's [`SectionBoundaries`] and publishes the active section
//! index through an [`Observable`]. Because the observable drops equal
//! writes, subscribers hear about each index change exactly once no matter
//! how many frames report the same progress.

use fscroll_core::section::{SectionBoundaries, SectionProgressState};
use fscroll_core::track::TrackId;
use tracing::warn;

use crate::error::{EngineError, Result};
use crate::reactive::{Observable, Subscription};

/// Publishes the active section of one track.
#[derive(Debug)]
pub struct SectionMapper {
    track: TrackId,
    boundaries: SectionBoundaries,
    state: SectionProgressState,
    active: Observable<usize>,
}

impl SectionMapper {
    /// Create a mapper at progress 0.
    ///
    /// Malformed thresholds are rejected.
    pub fn new(track: TrackId, boundaries: SectionBoundaries) -> Result<Self> {
        boundaries.validate().map_err(|reason| {
            warn!(%track, %reason, "section thresholds rejected");
            EngineError::InvalidThresholds { track, reason }
        })?;
        let state = SectionProgressState::derive(&boundaries, 0.0);
        Ok(Self {
            track,
            boundaries,
            state,
            active: Observable::new(state.active_index),
        })
    }

    /// Mapper over `panel_count` equal sections; always valid.
    #[must_use]
    pub fn uniform(track: TrackId, panel_count: usize) -> Self {
        let boundaries = SectionBoundaries::Uniform(panel_count);
        let state = SectionProgressState::derive(&boundaries, 0.0);
        Self {
            track,
            boundaries,
            state,
            active: Observable::new(state.active_index),
        }
    }

    /// Track this mapper follows.
    #[must_use]
    pub fn track(&self) -> TrackId {
        self.track
    }

    /// Feed the latest track progress.
    ///
    /// Returns the new index when it changed (and was published).
    pub fn update(&mut self, progress: f64) -> Option<usize> {
        self.state = SectionProgressState::derive(&self.boundaries, progress);
        self.active
            .set(self.state.active_index)
            .then_some(self.state.active_index)
    }

    /// Swap boundaries after a re-measure, re-deriving from the last
    /// progress. Invalid boundaries leave the mapper unchanged.
    pub fn set_boundaries(&mut self, boundaries: SectionBoundaries) -> Result<()> {
        if boundaries == self.boundaries {
            return Ok(());
        }
        let track = self.track;
        boundaries.validate().map_err(|reason| {
            warn!(%track, %reason, "section thresholds rejected");
            EngineError::InvalidThresholds { track, reason }
        })?;
        self.replace_boundaries(boundaries);
        Ok(())
    }

    /// Fall back to `panel_count` equal sections.
    pub fn set_uniform(&mut self, panel_count: usize) {
        self.replace_boundaries(SectionBoundaries::Uniform(panel_count));
    }

    fn replace_boundaries(&mut self, boundaries: SectionBoundaries) {
        self.boundaries = boundaries;
        let progress = self.state.track_progress;
        self.update(progress);
    }

    /// Latest derived state.
    #[must_use]
    pub fn state(&self) -> SectionProgressState {
        self.state
    }

    /// Currently published index.
    #[must_use]
    pub fn active_index(&self) -> usize {
        self.state.active_index
    }

    /// Shared handle to the published index.
    #[must_use]
    pub fn observable(&self) -> Observable<usize> {
        self.active.clone()
    }

    /// Subscribe to index changes.
    pub fn subscribe(&self, callback: impl Fn(&usize) + 'static) -> Subscription {
        self.active.subscribe(callback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fscroll_core::section::ThresholdError;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn publishes_only_on_change() {
        let mut mapper = SectionMapper::new(TrackId(0), SectionBoundaries::Uniform(3)).unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = Rc::clone(&log);
        let _sub = mapper.subscribe(move |i| l.borrow_mut().push(*i));

        for p in [0.0, 0.1, 0.2, 0.34, 0.5, 0.999, 1.0, 1.0] {
            mapper.update(p);
        }
        assert_eq!(*log.borrow(), vec![1, 2]);
    }

    #[test]
    fn reversal_maps_back() {
        let mut mapper = SectionMapper::new(TrackId(0), SectionBoundaries::Uniform(3)).unwrap();
        assert_eq!(mapper.update(0.9), Some(2));
        assert_eq!(mapper.update(0.1), Some(0));
        assert_eq!(mapper.update(0.2), None);
        assert_eq!(mapper.active_index(), 0);
    }

    #[test]
    fn thresholds_split_phases() {
        let mut mapper =
            SectionMapper::new(TrackId(0), SectionBoundaries::Thresholds(vec![0.5])).unwrap();
        assert_eq!(mapper.update(0.49), None);
        assert_eq!(mapper.update(0.5), Some(1));
    }

    #[test]
    fn invalid_thresholds_are_rejected() {
        let err = SectionMapper::new(TrackId(4), SectionBoundaries::Thresholds(vec![0.7, 0.2]))
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidThresholds {
                track: TrackId(4),
                reason: ThresholdError::NotAscending { index: 1 }
            }
        );
    }

    #[test]
    fn new_boundaries_rederive_index() {
        let mut mapper = SectionMapper::new(TrackId(0), SectionBoundaries::Uniform(2)).unwrap();
        mapper.update(0.7);
        assert_eq!(mapper.active_index(), 1);
        mapper.set_boundaries(SectionBoundaries::Uniform(5)).unwrap();
        assert_eq!(mapper.active_index(), 3);
        assert!(mapper.set_boundaries(SectionBoundaries::Thresholds(vec![2.0])).is_err());
        assert_eq!(mapper.active_index(), 3);
        mapper.set_uniform(2);
        assert_eq!(mapper.active_index(), 1);
    }

    #[test]
    fn uniform_constructor_starts_at_zero() {
        let mapper = SectionMapper::uniform(TrackId(7), 4);
        assert_eq!(mapper.track(), TrackId(7));
        assert_eq!(mapper.active_index(), 0);
        assert_eq!(mapper.observable().get(), 0);
    }
}
