//! Replay-of-one broadcast signals
//!
//! A [`Signal<T>`] is a single-slot cell with a listener list:
//! - Emitting stores the value and pushes it to every listener, in
//!   subscription order
//! - Subscribing hands the latest value (if any) to the new listener
//!   immediately, then every subsequent value
//! - Dropping the returned [`Subscription`] detaches the listener
//!
//! Signals are single-threaded (`Rc` + `RefCell`). No borrow is held while
//! listeners run, so a listener may emit on any signal, including the one
//! that is currently dispatching. A nested emission supersedes the outer
//! one: listeners the outer dispatch has not reached yet only see the newer
//! value.
//!
//! ```rust
//! use autoselect_core::reactive::Signal;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let count = Signal::with_value(1);
//! let seen = Rc::new(RefCell::new(Vec::new()));
//!
//! let seen_clone = seen.clone();
//! let _sub = count.subscribe(move |v| seen_clone.borrow_mut().push(*v));
//!
//! count.emit(2);
//! assert_eq!(*seen.borrow(), vec![1, 2]);
//! ```

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

new_key_type! {
    /// Unique identifier for a listener attached to a signal
    pub struct ListenerId;
}

type Listener<T> = Rc<dyn Fn(&T)>;

/// Internal signal node storage
struct SignalNode<T> {
    /// Latest emitted value, `None` until the first emission
    value: Option<T>,
    /// Number of emissions so far
    version: u64,
    /// Listener storage
    listeners: SlotMap<ListenerId, Listener<T>>,
    /// Dispatch order (slot reuse would otherwise reorder listeners)
    order: SmallVec<[ListenerId; 4]>,
}

impl<T> SignalNode<T> {
    fn detach(&mut self, id: ListenerId) {
        if self.listeners.remove(id).is_some() {
            self.order.retain(|l| *l != id);
        }
    }
}

/// A replayed broadcast channel (cheap to clone, clones share state)
pub struct Signal<T> {
    node: Rc<RefCell<SignalNode<T>>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            node: Rc::clone(&self.node),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.node.borrow();
        f.debug_struct("Signal")
            .field("value", &node.value)
            .field("version", &node.version)
            .field("listeners", &node.order.len())
            .finish()
    }
}

impl<T: Clone + 'static> Signal<T> {
    /// Create a signal that holds no value until its first emission
    pub fn new() -> Self {
        Self {
            node: Rc::new(RefCell::new(SignalNode {
                value: None,
                version: 0,
                listeners: SlotMap::with_key(),
                order: SmallVec::new(),
            })),
        }
    }

    /// Create a signal that already holds `initial`
    ///
    /// Late subscribers receive `initial` until something else is emitted.
    pub fn with_value(initial: T) -> Self {
        let signal = Self::new();
        signal.node.borrow_mut().value = Some(initial);
        signal
    }

    /// Get the latest value
    pub fn get(&self) -> Option<T> {
        self.node.borrow().value.clone()
    }

    /// Whether anything has been emitted (or an initial value was given)
    pub fn has_value(&self) -> bool {
        self.node.borrow().value.is_some()
    }

    /// Number of emissions so far
    pub fn version(&self) -> u64 {
        self.node.borrow().version
    }

    /// Number of attached listeners
    pub fn listener_count(&self) -> usize {
        self.node.borrow().order.len()
    }

    /// Store `value` and push it to every listener
    pub fn emit(&self, value: T) {
        let (version, listeners): (u64, SmallVec<[Listener<T>; 4]>) = {
            let mut node = self.node.borrow_mut();
            node.value = Some(value.clone());
            node.version += 1;
            let listeners = node
                .order
                .iter()
                .filter_map(|id| node.listeners.get(*id).cloned())
                .collect();
            (node.version, listeners)
        };

        for listener in listeners {
            if self.version() != version {
                // A listener re-emitted; the rest already saw the newer value
                break;
            }
            listener(&value);
        }
    }

    /// Emit only if `value` differs from the latest value
    ///
    /// Returns whether an emission happened.
    pub fn emit_distinct(&self, value: T) -> bool
    where
        T: PartialEq,
    {
        if self.node.borrow().value.as_ref() == Some(&value) {
            return false;
        }
        self.emit(value);
        true
    }

    /// Attach a listener, replaying the latest value to it immediately
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + 'static,
    {
        let listener: Listener<T> = Rc::new(listener);
        let (subscription, current) = self.attach(Rc::clone(&listener));
        if let Some(value) = current {
            listener(&value);
        }
        subscription
    }

    /// Attach a listener that only sees values emitted from now on
    pub fn subscribe_changes<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + 'static,
    {
        self.attach(Rc::new(listener)).0
    }

    fn attach(&self, listener: Listener<T>) -> (Subscription, Option<T>) {
        let mut node = self.node.borrow_mut();
        let id = node.listeners.insert(listener);
        node.order.push(id);

        let weak: Weak<RefCell<SignalNode<T>>> = Rc::downgrade(&self.node);
        let subscription = Subscription::new(move || {
            if let Some(node) = weak.upgrade() {
                node.borrow_mut().detach(id);
            }
        });
        (subscription, node.value.clone())
    }
}

impl<T: Clone + 'static> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a focus flag: a boolean signal that always holds a value
pub fn focus_signal() -> Signal<bool> {
    Signal::with_value(false)
}

/// Handle for a listener attached to a [`Signal`]
///
/// The listener is detached when the handle is dropped or
/// [`unsubscribe`](Subscription::unsubscribe)d.
#[must_use = "dropping a Subscription detaches its listener"]
pub struct Subscription {
    detach: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    fn new(detach: impl FnOnce() + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    /// Detach the listener now
    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.detach.is_some())
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder<T: Clone + 'static>() -> (Rc<RefCell<Vec<T>>>, impl Fn(&T) + 'static) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let log_clone = log.clone();
        (log, move |v: &T| log_clone.borrow_mut().push(v.clone()))
    }

    #[test]
    fn test_signal_create_get_emit() {
        let signal = Signal::new();
        assert_eq!(signal.get(), None::<i32>);
        assert!(!signal.has_value());

        signal.emit(42);
        assert_eq!(signal.get(), Some(42));
        assert_eq!(signal.version(), 1);
    }

    #[test]
    fn test_late_subscriber_gets_latest() {
        let signal = Signal::new();
        signal.emit(1);
        signal.emit(2);

        let (log, listener) = recorder();
        let _sub = signal.subscribe(listener);
        assert_eq!(*log.borrow(), vec![2]);

        signal.emit(3);
        assert_eq!(*log.borrow(), vec![2, 3]);
    }

    #[test]
    fn test_subscribe_before_any_value() {
        let signal = Signal::new();
        let (log, listener) = recorder::<String>();
        let _sub = signal.subscribe(listener);
        assert!(log.borrow().is_empty());

        signal.emit("a".to_string());
        assert_eq!(*log.borrow(), vec!["a".to_string()]);
    }

    #[test]
    fn test_subscribe_changes_skips_replay() {
        let signal = Signal::with_value(true);
        let (log, listener) = recorder();
        let _sub = signal.subscribe_changes(listener);
        assert!(log.borrow().is_empty());

        signal.emit(false);
        assert_eq!(*log.borrow(), vec![false]);
    }

    #[test]
    fn test_emit_distinct() {
        let signal = Signal::with_value(5);
        let (log, listener) = recorder();
        let _sub = signal.subscribe_changes(listener);

        assert!(!signal.emit_distinct(5));
        assert!(signal.emit_distinct(6));
        assert!(!signal.emit_distinct(6));
        assert_eq!(*log.borrow(), vec![6]);
    }

    #[test]
    fn test_nested_emit_supersedes_outer_dispatch() {
        let signal = Signal::new();
        let inner = signal.clone();
        let _bump = signal.subscribe_changes(move |v: &i32| {
            if *v == 1 {
                inner.emit(2);
            }
        });
        let (log, listener) = recorder();
        let _sub = signal.subscribe_changes(listener);

        signal.emit(1);
        assert_eq!(*log.borrow(), vec![2]);
        assert_eq!(signal.get(), Some(2));
    }

    #[test]
    fn test_drop_detaches() {
        let signal = Signal::new();
        let (log, listener) = recorder();
        let sub = signal.subscribe(listener);
        signal.emit(1);
        assert_eq!(signal.listener_count(), 1);

        drop(sub);
        assert_eq!(signal.listener_count(), 0);
        signal.emit(2);
        assert_eq!(*log.borrow(), vec![1]);
    }

    #[test]
    fn test_dispatch_order_survives_slot_reuse() {
        let signal = Signal::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let o = order.clone();
        let first = signal.subscribe_changes(move |_: &i32| o.borrow_mut().push("a"));
        let o = order.clone();
        let _second = signal.subscribe_changes(move |_: &i32| o.borrow_mut().push("b"));
        first.unsubscribe();
        let o = order.clone();
        let _third = signal.subscribe_changes(move |_: &i32| o.borrow_mut().push("c"));

        signal.emit(0);
        assert_eq!(*order.borrow(), vec!["b", "c"]);
    }

    #[test]
    fn test_listener_may_emit_reentrantly() {
        let source = Signal::new();
        let doubled = Signal::new();

        let doubled_clone = doubled.clone();
        let _a = source.subscribe(move |v: &i32| doubled_clone.emit(v * 2));
        let (log, listener) = recorder();
        let _b = doubled.subscribe(listener);

        source.emit(3);
        source.emit(4);
        assert_eq!(*log.borrow(), vec![6, 8]);
    }

    #[test]
    fn test_focus_signal_defaults_false() {
        let focus = focus_signal();
        assert_eq!(focus.get(), Some(false));
    }
}
