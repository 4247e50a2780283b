//! Label projector
//!
//! Projects the canonical value through the value→label map. Values missing
//! from the map (the empty marker, an unmatched startup value, a value whose
//! option was removed) project to the empty string. The label signal starts
//! at `""` so the text box is blank before any value exists.

use std::cell::RefCell;
use std::rc::Rc;

use autoselect_core::{Scope, Signal};

use crate::option::{OptionIndex, OptionSource, OptionValue};

pub struct LabelProjector<V: OptionValue> {
    label: Signal<String>,
    value: RefCell<Option<V>>,
    index: RefCell<Option<Rc<OptionIndex<V>>>>,
}

impl<V: OptionValue> LabelProjector<V> {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            label: Signal::with_value(String::new()),
            value: RefCell::new(None),
            index: RefCell::new(None),
        })
    }

    /// Re-project on every canonical value and every index publish
    pub fn connect(
        self: &Rc<Self>,
        canonical: &Signal<Option<V>>,
        options: &OptionSource<V>,
        scope: &Scope,
    ) {
        let this = Rc::clone(self);
        scope.subscribe_changes(options.published(), move |index| {
            *this.index.borrow_mut() = Some(Rc::clone(index));
            this.project();
        });
        *self.index.borrow_mut() = options.current();

        let this = Rc::clone(self);
        scope.subscribe(canonical, move |value| {
            *this.value.borrow_mut() = value.clone();
            this.project();
        });
    }

    /// Replayed stream of display labels
    pub fn label(&self) -> &Signal<String> {
        &self.label
    }

    /// The most recently projected label
    pub fn last_label(&self) -> String {
        self.label.get().unwrap_or_default()
    }

    /// Emit the current label again, e.g. after the text box was reverted
    pub fn republish(&self) {
        self.project();
    }

    fn project(&self) {
        let label = {
            let value = self.value.borrow();
            let index = self.index.borrow();
            match (value.as_ref(), index.as_ref()) {
                (Some(value), Some(index)) => {
                    index.label_for(value).map(str::to_string).unwrap_or_default()
                }
                _ => String::new(),
            }
        };
        tracing::trace!(%label, "projected label");
        self.label.emit(label);
    }
}
