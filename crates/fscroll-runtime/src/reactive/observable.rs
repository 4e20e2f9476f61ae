#![forbid(unsafe_code)]

//! Observable value with change-only notification.
//!
//! # Design
//!
//! [`Observable<T>`] keeps a value in shared `Rc<RefCell<..>>` storage. A
//! `set` that leaves the value equal (by `PartialEq`) is a no-op; a real
//! change bumps the version and notifies every live subscriber in
//! registration order. This is how the engine publishes `ready` and each
//! track's active section index without redundant downstream work.
//!
//! # Failure Modes
//!
//! - **Subscriber leak**: dropping a [`Subscription`] detaches its callback;
//!   holding guards forever accumulates callbacks. Dead weak references are
//!   pruned lazily on the next notification.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::{debug, debug_span};
use web_time::Instant;

type CallbackRc<T> = Rc<dyn Fn(&T)>;
type CallbackWeak<T> = Weak<dyn Fn(&T)>;

struct ObservableInner<T> {
    value: T,
    version: u64,
    subscribers: Vec<CallbackWeak<T>>,
}

/// A shared, version-tracked value with change notification.
///
/// Cloning an `Observable` yields another handle to the same state.
///
/// # Invariants
///
/// 1. `version` increments by exactly 1 on each value-changing `set`.
/// 2. `set(v)` where `v == current` notifies nobody.
/// 3. Subscribers are notified in registration order.
pub struct Observable<T> {
    inner: Rc<RefCell<ObservableInner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .field("subscriber_count", &inner.subscribers.len())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    /// Create an observable at version 0 with no subscribers.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ObservableInner {
                value,
                version: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Replace the value, notifying subscribers only if it changed.
    ///
    /// Returns whether a notification was sent.
    pub fn set(&self, value: T) -> bool {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                return false;
            }
            inner.value = value;
            inner.version += 1;
        }
        self.notify();
        true
    }

    /// Subscribe to changes. Dropping the returned guard unsubscribes.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let strong: CallbackRc<T> = Rc::new(callback);
        self.inner
            .borrow_mut()
            .subscribers
            .push(Rc::downgrade(&strong));
        Subscription {
            _guard: Box::new(strong),
        }
    }

    /// Number of value-changing mutations so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Registered subscribers, including dead ones not yet pruned.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    fn notify(&self) {
        // Collect first so no borrow is held while callbacks run.
        let (callbacks, value): (Vec<CallbackRc<T>>, T) = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.retain(|w| w.strong_count() > 0);
            let callbacks = inner.subscribers.iter().filter_map(Weak::upgrade).collect();
            (callbacks, inner.value.clone())
        };
        if callbacks.is_empty() {
            return;
        }

        let subscribers = callbacks.len() as u64;
        let started = Instant::now();
        let _span = debug_span!(
            "fscroll.publish",
            subscribers,
            duration_us = tracing::field::Empty
        )
        .entered();

        for cb in &callbacks {
            cb(&value);
        }

        let duration_us = started.elapsed().as_micros() as u64;
        tracing::Span::current().record("duration_us", duration_us);
        debug!(duration_us, subscribers, "observable change published");
    }
}

/// RAII guard keeping a subscriber callback alive.
pub struct Subscription {
    _guard: Box<dyn std::any::Any>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}
