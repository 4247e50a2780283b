//! Cancel-and-restart debouncing
//!
//! A [`Debouncer`] holds at most one pending value with a deadline. Each
//! [`schedule`](Debouncer::schedule) replaces the pending value and restarts
//! the wait; [`poll`](Debouncer::poll) hands the value out once the deadline
//! has passed. There is no background timer: the owner polls from its tick.
//!
//! A zero delay makes `schedule` return the value straight away, which keeps
//! zero-debounce configurations fully synchronous.

use std::time::{Duration, Instant};

/// Quiet-period filter for a stream of values
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replace the pending value and restart the quiet period
    ///
    /// Returns the value immediately when the delay is zero.
    pub fn schedule(&mut self, value: T, now: Instant) -> Option<T> {
        if self.delay.is_zero() {
            self.pending = None;
            return Some(value);
        }
        self.pending = Some((now + self.delay, value));
        None
    }

    /// Take the pending value if its quiet period has elapsed
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.pending {
            Some((deadline, _)) if deadline <= now => self.pending.take().map(|(_, v)| v),
            _ => None,
        }
    }

    /// When the pending value becomes due
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(deadline, _)| *deadline)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop the pending value without delivering it
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(_, v)| v)
    }
}
