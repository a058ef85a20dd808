#![forbid(unsafe_code)]

//! Change-notifying flag for single-threaded state machines.
//!
//! [`Observable<T>`] holds a small `Copy` value and a list of listeners. A
//! write that changes the value calls every live listener with the new value,
//! oldest first. The observable only keeps weak handles; the
//! [`Subscription`] returned by [`Observable::subscribe`] owns the listener,
//! so dropping it detaches.
//!
//! Listeners may write to the same or another observable: the listener list
//! is snapshotted before any of them runs.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

type Listener<T> = dyn Fn(T);

/// A `Copy` value that reports its changes.
pub struct Observable<T> {
    value: Cell<T>,
    listeners: RefCell<Vec<Weak<Listener<T>>>>,
}

impl<T: Copy + std::fmt::Debug> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Observable").field(&self.value.get()).finish()
    }
}

impl<T: Copy + PartialEq + 'static> Observable<T> {
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            value: Cell::new(value),
            listeners: RefCell::new(Vec::new()),
        }
    }

    #[inline]
    #[must_use]
    pub fn get(&self) -> T {
        self.value.get()
    }

    /// Store `value`. Listeners run only if it differs from the current one.
    ///
    /// Returns whether the value changed.
    pub fn set(&self, value: T) -> bool {
        if self.value.replace(value) == value {
            return false;
        }
        let live: Vec<Rc<Listener<T>>> = {
            let mut listeners = self.listeners.borrow_mut();
            listeners.retain(|l| l.strong_count() > 0);
            listeners.iter().filter_map(Weak::upgrade).collect()
        };
        if !live.is_empty() {
            tracing::trace!(message = "swipe.observable.notify", listeners = live.len() as u64);
        }
        for listener in live {
            listener(value);
        }
        true
    }

    /// Attach `listener` until the returned guard is dropped.
    pub fn subscribe(&self, listener: impl Fn(T) + 'static) -> Subscription<T> {
        let listener: Rc<Listener<T>> = Rc::new(listener);
        self.listeners.borrow_mut().push(Rc::downgrade(&listener));
        Subscription { _listener: listener }
    }
}

/// Owns a listener attached with [`Observable::subscribe`].
#[must_use = "dropping the subscription detaches the listener"]
pub struct Subscription<T> {
    _listener: Rc<Listener<T>>,
}

impl<T> std::fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}
