#![forbid(unsafe_code)]

//! FrankenScroll Runtime
//!
//! This crate turns the primitives of `fscroll-core` into a running scroll
//! choreography engine: raw wheel/touch input becomes a smoothed virtual
//! scroll position, which drives scroll-linked bindings, pinned horizontal
//! tracks, and a published active-section index.
//!
//! # Key Components
//!
//! - [`InertialScrollDriver`] - Eased virtual scroll position fed by gestures
//! - [`ScrollSourceAdapter`] - The one place raw deltas are read and remapped
//! - [`TriggerRegistry`] - Progress-keyed bindings and pinning
//! - [`SectionMapper`] - Continuous progress to a discrete active index
//! - [`ScrollLifecycle`] - Setup gate, frame pipeline, resize, teardown
//! - [`FrameClock`] - The single frame subscription of a page
//! - [`EngineConfig`] - Every tunable as data
//!
//! # Role in FrankenScroll
//! `fscroll-runtime` is the orchestrator. Hosts push input and frame
//! timestamps into a [`ScrollLifecycle`]; presentation code subscribes to
//! the `ready` flag, the per-track active section, and per-binding progress.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//!
//! use fscroll_core::geometry::ViewportRect;
//! use fscroll_core::input::InputEvent;
//! use fscroll_core::track::{LayoutSnapshot, SyntheticLayout, TrackId, TrackLayout};
//! use fscroll_runtime::{EngineConfig, ScrollLifecycle, SetupOutcome};
//!
//! let layout = Rc::new(SyntheticLayout::new(LayoutSnapshot {
//!     viewport: ViewportRect::from_size(1000.0, 800.0),
//!     document_extent: 2400.0,
//!     tracks: vec![TrackLayout::horizontal(TrackId(0), 0.0, vec![1000.0; 3])],
//! }));
//!
//! let mut page = ScrollLifecycle::new(EngineConfig::default());
//! assert_eq!(page.setup(layout).unwrap(), SetupOutcome::Deferred);
//! page.set_content_ready(true).unwrap();
//! assert!(page.ready().get());
//!
//! page.input(InputEvent::wheel(0.0, 600.0));
//! let mut ts = 0.0;
//! while ts < 2000.0 {
//!     page.frame(ts);
//!     ts += 16.0;
//! }
//! assert_eq!(page.position(), Some(600.0));
//! ```

pub mod adapter;
pub mod cancellation;
pub mod clock;
pub mod config;
pub mod debounce;
pub mod driver;
pub mod error;
pub mod lifecycle;
pub mod mapper;
pub mod reactive;
pub mod registry;

pub use adapter::{RouteOutcome, ScrollSource, ScrollSourceAdapter};
pub use cancellation::{CancellationSource, CancellationToken};
pub use clock::{ClockHandle, FrameClock};
pub use config::{ConfigError, EngineConfig, GestureOrientation};
pub use debounce::{DEFAULT_RESIZE_DEBOUNCE, ResizeDebouncer};
pub use driver::{
    Direction, DriverConfig, GestureDelta, InertialScrollDriver, ListenerId, ScrollEvent,
    ScrollToOptions, VirtualScrollState,
};
pub use error::{EngineError, Result};
pub use lifecycle::{ScrollLifecycle, SetupOutcome};
pub use mapper::SectionMapper;
pub use reactive::{Observable, Subscription};
pub use registry::{TriggerBinding, TriggerEvent, TriggerId, TriggerRegistry, TriggerState};
