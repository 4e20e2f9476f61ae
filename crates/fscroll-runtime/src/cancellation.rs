//! Cancellation tokens for frame subscriptions and deferred work.
//!
//! A host schedules frames and timers outside the engine's control, so a
//! callback can fire after the engine it belongs to was torn down. Every
//! such callback carries a [`CancellationToken`] and checks it first; the
//! engine cancels the matching [`CancellationSource`] during teardown.
//!
//! # Example
//!
//! ```
//! use fscroll_runtime::cancellation::CancellationSource;
//!
//! let source = CancellationSource::new();
//! let token = source.token();
//! assert!(!token.is_cancelled());
//!
//! source.cancel();
//! assert!(token.is_cancelled());
//! ```

#![forbid(unsafe_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A cloneable view of a cancellation flag.
#[derive(Clone, Debug)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

/// The control handle that triggers cancellation.
///
/// Dropping the source does **not** cancel its tokens; call
/// [`cancel`](Self::cancel) explicitly.
#[derive(Debug)]
pub struct CancellationSource {
    cancelled: Arc<AtomicBool>,
}

impl CancellationSource {
    /// Create a source whose tokens start uncancelled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Obtain a token observing this source.
    #[must_use]
    pub fn token(&self) -> CancellationToken {
        CancellationToken {
            cancelled: Arc::clone(&self.cancelled),
        }
    }

    /// Signal cancellation to every token. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancellationSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationToken {
    /// Returns `true` once the source was cancelled.
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
