#![forbid(unsafe_code)]

//! Core: easing, smoothing, geometry, input, and layout measurement.
//!
//! # Role in FrankenScroll
//! `fscroll-core` holds the pure, allocation-light building blocks that the
//! runtime composes into a scroll choreography engine. Nothing in this crate
//! owns a clock or a callback list; every type is advanced explicitly by the
//! caller, which keeps it deterministic and trivially testable.
//!
//! # Primary responsibilities
//! - **animation**: easing curves, the eased [`animation::tween::ScrollTween`]
//!   used by the inertial driver, and the [`animation::scrub::Scrub`] lag used
//!   by scroll-linked triggers.
//! - **geometry**: axes, viewport rectangles, and translations.
//! - **input**: normalized wheel/touch deltas and per-frame coalescing.
//! - **track**: panel measurements, scrollable distances, and the
//!   [`track::LayoutProvider`] seam that decouples the engine from a renderer.
//! - **section**: mapping continuous progress to a discrete active index.
//!
//! # How it fits in the system
//! `fscroll-runtime` owns the frame pipeline and lifecycle; it consumes these
//! primitives and never reimplements them. Hosts (see `fscroll-web`) only
//! ever talk to the runtime.

pub mod animation;
pub mod geometry;
pub mod input;
pub mod section;
pub mod track;

pub use animation::{Animation, EasingFn};
pub use geometry::{Axis, Translate, ViewportRect};
pub use input::{InputCoalescer, InputEvent, InputSource, WheelDeltaMode};
pub use section::{SectionBoundaries, SectionProgressState, compute_active_index};
pub use track::{LayoutProvider, LayoutSnapshot, SyntheticLayout, TrackId, TrackLayout};
