//! Value reconciler
//!
//! Merges candidate values from every input source into the canonical value:
//!
//! 1. Typed text waits out [`TEXT_MATCH_DEBOUNCE`], is deduplicated against the
//!    previous settled text, and is looked up as an exact label. Only a hit
//!    becomes a candidate.
//! 2. External writes, menu selections, text matches and explicit clears are
//!    merged in arrival order. There is no priority between sources: when two
//!    fire close together, the later one wins.
//! 3. A candidate is accepted only if the *latest* index contains it (`None`
//!    always passes). The last candidate is re-checked on every index
//!    publish, so options that arrive late can still validate it.
//! 4. Accepted values are published on a replayed, deduplicated signal.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

use autoselect_core::{Clock, Debouncer, Scope, Signal};

use crate::events::FieldEvents;
use crate::option::{OptionIndex, OptionSource, OptionValue};

/// Quiet period before typed text is matched against labels
///
/// Independent of the configurable menu debounce.
pub const TEXT_MATCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Where a candidate came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CandidateSource {
    External,
    Selection,
    TextMatch,
    Clear,
}

/// A value waiting to be validated against the option index
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate<V> {
    pub source: CandidateSource,
    pub value: Option<V>,
}

impl<V> Candidate<V> {
    pub fn new(source: CandidateSource, value: Option<V>) -> Self {
        Self { source, value }
    }
}

/// Counters for diagnostics
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub candidates: u64,
    pub accepted: u64,
    pub dropped: u64,
}

/// The only writer of the canonical value
pub struct Reconciler<V: OptionValue> {
    canonical: Signal<Option<V>>,
    index: RefCell<Option<Rc<OptionIndex<V>>>>,
    last_candidate: RefCell<Option<Candidate<V>>>,
    text_debounce: RefCell<Debouncer<String>>,
    last_settled_text: RefCell<Option<String>>,
    clock: Rc<dyn Clock>,
    stats: Cell<ReconcileStats>,
}

impl<V: OptionValue> Reconciler<V> {
    pub fn new(clock: Rc<dyn Clock>) -> Rc<Self> {
        Rc::new(Self {
            canonical: Signal::new(),
            index: RefCell::new(None),
            last_candidate: RefCell::new(None),
            text_debounce: RefCell::new(Debouncer::new(TEXT_MATCH_DEBOUNCE)),
            last_settled_text: RefCell::new(None),
            clock,
            stats: Cell::new(ReconcileStats::default()),
        })
    }

    /// Wire the candidate sources for the lifetime of `scope`
    pub fn connect(
        self: &Rc<Self>,
        events: &FieldEvents<V>,
        options: &OptionSource<V>,
        scope: &Scope,
    ) {
        let this = Rc::clone(self);
        scope.subscribe(options.published(), move |index| {
            *this.index.borrow_mut() = Some(Rc::clone(index));
            this.revalidate();
        });

        let this = Rc::clone(self);
        scope.subscribe(&events.external_value, move |value| {
            this.submit(Candidate::new(CandidateSource::External, value.clone()));
        });

        let this = Rc::clone(self);
        scope.subscribe(&events.selection, move |value| {
            this.submit(Candidate::new(CandidateSource::Selection, Some(value.clone())));
        });

        let this = Rc::clone(self);
        scope.subscribe(&events.text_input, move |text| {
            let now = this.clock.now();
            let due = this.text_debounce.borrow_mut().schedule(text.clone(), now);
            if let Some(text) = due {
                this.settle_text(text);
            }
        });
    }

    /// Validate `candidate` against the latest index and promote it if valid
    pub fn submit(&self, candidate: Candidate<V>) {
        *self.last_candidate.borrow_mut() = Some(candidate.clone());
        self.check(&candidate);
    }

    /// Reset the canonical value to the empty marker
    pub fn clear(&self) {
        self.submit(Candidate::new(CandidateSource::Clear, None));
    }

    /// Deliver due debounced text
    pub fn poll(&self, now: Instant) {
        let due = self.text_debounce.borrow_mut().poll(now);
        if let Some(text) = due {
            self.settle_text(text);
        }
    }

    /// When the pending typed text becomes due
    pub fn next_deadline(&self) -> Option<Instant> {
        self.text_debounce.borrow().deadline()
    }

    /// Replayed stream of accepted values
    pub fn canonical(&self) -> &Signal<Option<V>> {
        &self.canonical
    }

    /// Latest accepted value (`None` if nothing accepted or cleared)
    pub fn value(&self) -> Option<V> {
        self.canonical.get().flatten()
    }

    pub fn stats(&self) -> ReconcileStats {
        self.stats.get()
    }

    fn settle_text(&self, text: String) {
        if self.last_settled_text.borrow().as_deref() == Some(text.as_str()) {
            tracing::trace!(%text, "settled text unchanged");
            return;
        }
        *self.last_settled_text.borrow_mut() = Some(text.clone());

        let matched = self
            .index
            .borrow()
            .as_ref()
            .and_then(|index| index.value_for(&text).cloned());
        match matched {
            Some(value) => self.submit(Candidate::new(CandidateSource::TextMatch, Some(value))),
            None => tracing::trace!(%text, "typed text matches no label"),
        }
    }

    fn revalidate(&self) {
        let candidate = self.last_candidate.borrow().clone();
        if let Some(candidate) = candidate {
            tracing::trace!(source = ?candidate.source, "revalidating last candidate");
            self.check(&candidate);
        }
    }

    fn check(&self, candidate: &Candidate<V>) {
        let accepted = match &candidate.value {
            None => true,
            Some(value) => self
                .index
                .borrow()
                .as_ref()
                .is_some_and(|index| index.contains_value(value)),
        };

        let mut stats = self.stats.get();
        stats.candidates += 1;
        if accepted {
            stats.accepted += 1;
            self.stats.set(stats);
            if self.canonical.emit_distinct(candidate.value.clone()) {
                tracing::debug!(
                    source = ?candidate.source,
                    value = ?candidate.value,
                    "canonical value changed"
                );
            }
        } else {
            stats.dropped += 1;
            self.stats.set(stats);
            tracing::debug!(
                source = ?candidate.source,
                value = ?candidate.value,
                "dropping candidate not in option index"
            );
        }
    }
}
