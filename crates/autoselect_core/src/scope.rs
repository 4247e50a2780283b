//! Lifecycle-scoped subscriptions
//!
//! A [`Scope`] owns every [`Subscription`] a component creates while it is
//! alive and releases them together on [`Scope::teardown`] or drop. This is
//! the "subscribe now, auto-unsubscribe on teardown" helper components use
//! for every side-effecting listener.
//!
//! ```rust
//! use autoselect_core::{Scope, Signal};
//!
//! let signal = Signal::with_value(0);
//! let scope = Scope::new();
//! scope.subscribe(&signal, |v| println!("value: {v}"));
//! assert_eq!(signal.listener_count(), 1);
//!
//! scope.teardown();
//! assert_eq!(signal.listener_count(), 0);
//! ```

use std::cell::{Cell, RefCell};

use crate::reactive::{Signal, Subscription};

/// Owner of a component's subscriptions
#[derive(Debug, Default)]
pub struct Scope {
    subscriptions: RefCell<Vec<Subscription>>,
    torn_down: Cell<bool>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep `subscription` alive until teardown
    ///
    /// After teardown the subscription is released immediately.
    pub fn add(&self, subscription: Subscription) {
        if self.torn_down.get() {
            tracing::trace!("scope already torn down, releasing subscription");
            subscription.unsubscribe();
            return;
        }
        self.subscriptions.borrow_mut().push(subscription);
    }

    /// Subscribe with replay and keep the subscription in this scope
    pub fn subscribe<T, F>(&self, signal: &Signal<T>, listener: F)
    where
        T: Clone + 'static,
        F: Fn(&T) + 'static,
    {
        self.add(signal.subscribe(listener));
    }

    /// Subscribe without replay and keep the subscription in this scope
    pub fn subscribe_changes<T, F>(&self, signal: &Signal<T>, listener: F)
    where
        T: Clone + 'static,
        F: Fn(&T) + 'static,
    {
        self.add(signal.subscribe_changes(listener));
    }

    /// Number of live subscriptions
    pub fn len(&self) -> usize {
        self.subscriptions.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down.get()
    }

    /// Release every subscription; later additions are released on arrival
    pub fn teardown(&self) {
        if self.torn_down.replace(true) {
            return;
        }
        // Take the list first: detaching may drop closures that own other scopes
        let subscriptions = std::mem::take(&mut *self.subscriptions.borrow_mut());
        tracing::trace!(count = subscriptions.len(), "scope teardown");
        drop(subscriptions);
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        self.teardown();
    }
}
