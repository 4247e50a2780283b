//! Filter engine
//!
//! The visible menu is the option list narrowed by whichever text was active
//! last: raw typed text while editing, or the projected label when idle.
//! Matching is a case-insensitive substring test on the label after trimming
//! the query. Order is the option order; there is no scoring.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use autoselect_core::{Clock, Debouncer, Scope, Signal};

use crate::option::{FieldOption, OptionIndex, OptionSource, OptionValue};

/// Options whose label contains `text`, ignoring case and surrounding spaces
///
/// Empty text keeps every option.
pub fn filter_options<V: Clone>(options: &[FieldOption<V>], text: &str) -> Vec<FieldOption<V>> {
    let needle = text.trim().to_lowercase();
    if needle.is_empty() {
        return options.to_vec();
    }
    options
        .iter()
        .filter(|option| option.label.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

pub struct FilterEngine<V: OptionValue> {
    filtered: Signal<Vec<FieldOption<V>>>,
    settled_text: RefCell<String>,
    index: RefCell<Option<Rc<OptionIndex<V>>>>,
    debounce: RefCell<Debouncer<String>>,
    clock: Rc<dyn Clock>,
}

impl<V: OptionValue> FilterEngine<V> {
    pub fn new(debounce: Duration, clock: Rc<dyn Clock>) -> Rc<Self> {
        Rc::new(Self {
            filtered: Signal::new(),
            settled_text: RefCell::new(String::new()),
            index: RefCell::new(None),
            debounce: RefCell::new(Debouncer::new(debounce)),
            clock,
        })
    }

    pub fn connect(
        self: &Rc<Self>,
        text_input: &Signal<String>,
        label: &Signal<String>,
        options: &OptionSource<V>,
        scope: &Scope,
    ) {
        let this = Rc::clone(self);
        scope.subscribe(options.published(), move |index| {
            *this.index.borrow_mut() = Some(Rc::clone(index));
            this.refresh();
        });

        for source in [text_input, label] {
            let this = Rc::clone(self);
            scope.subscribe(source, move |text| this.push_text(text.clone()));
        }
    }

    /// Replayed stream of visible options
    ///
    /// Silent until the first index publish.
    pub fn filtered(&self) -> &Signal<Vec<FieldOption<V>>> {
        &self.filtered
    }

    /// Deliver due debounced text
    pub fn poll(&self, now: Instant) {
        let due = self.debounce.borrow_mut().poll(now);
        if let Some(text) = due {
            self.settle(text);
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.debounce.borrow().deadline()
    }

    fn push_text(&self, text: String) {
        let now = self.clock.now();
        let due = self.debounce.borrow_mut().schedule(text, now);
        if let Some(text) = due {
            self.settle(text);
        }
    }

    fn settle(&self, text: String) {
        *self.settled_text.borrow_mut() = text;
        self.refresh();
    }

    fn refresh(&self) {
        let visible = {
            let index = self.index.borrow();
            let Some(index) = index.as_ref() else {
                return;
            };
            filter_options(index.options(), &self.settled_text.borrow())
        };
        tracing::trace!(visible = visible.len(), "menu filtered");
        self.filtered.emit(visible);
    }
}
