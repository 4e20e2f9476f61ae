#![forbid(unsafe_code)]

//! Reactive state published by the engine.
//!
//! The page never polls the engine: `ready` and each track's active section
//! index are [`Observable`]s, and presentation code subscribes to them.

pub mod observable;

pub use observable::{Observable, Subscription};
