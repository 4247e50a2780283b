//! Options and the option index
//!
//! [`OptionIndex`] is an immutable snapshot of one option collection plus its
//! two lookup maps. [`OptionSource`] owns the current snapshot and publishes a
//! fresh one whenever a non-empty collection is supplied.

use std::fmt::Debug;
use std::hash::Hash;
use std::rc::Rc;

use autoselect_core::Signal;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Values an option can carry
///
/// Values are used as map keys, so they only need equality and hashing.
pub trait OptionValue: Clone + Eq + Hash + Debug + 'static {}

impl<T: Clone + Eq + Hash + Debug + 'static> OptionValue for T {}

/// One entry of the option list
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption<V> {
    /// Display text, also what typed text is matched against
    pub label: String,
    /// Value written to the bound field when this option is chosen
    pub value: V,
}

impl<V> FieldOption<V> {
    pub fn new(label: impl Into<String>, value: V) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Snapshot of an option collection with value→label and label→value maps
///
/// Duplicate values or labels are allowed; the later option wins the lookup.
#[derive(Debug)]
pub struct OptionIndex<V: OptionValue> {
    options: Vec<FieldOption<V>>,
    value_to_label: FxHashMap<V, String>,
    label_to_value: FxHashMap<String, V>,
}

impl<V: OptionValue> OptionIndex<V> {
    pub fn build(options: Vec<FieldOption<V>>) -> Self {
        let mut value_to_label = FxHashMap::default();
        let mut label_to_value = FxHashMap::default();
        value_to_label.reserve(options.len());
        label_to_value.reserve(options.len());

        for option in &options {
            value_to_label.insert(option.value.clone(), option.label.clone());
            label_to_value.insert(option.label.clone(), option.value.clone());
        }

        Self {
            options,
            value_to_label,
            label_to_value,
        }
    }

    /// Options in their original order
    pub fn options(&self) -> &[FieldOption<V>] {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn label_for(&self, value: &V) -> Option<&str> {
        self.value_to_label.get(value).map(String::as_str)
    }

    /// Exact (case-sensitive) label lookup
    pub fn value_for(&self, label: &str) -> Option<&V> {
        self.label_to_value.get(label)
    }

    pub fn contains_value(&self, value: &V) -> bool {
        self.value_to_label.contains_key(value)
    }
}

/// The option index component
///
/// Replaces its snapshot wholesale on every accepted update and publishes it
/// through [`OptionSource::published`]. Empty collections are ignored: hosts
/// that load options asynchronously may briefly supply one, and accepting it
/// would invalidate the current value.
pub struct OptionSource<V: OptionValue> {
    published: Signal<Rc<OptionIndex<V>>>,
}

impl<V: OptionValue> OptionSource<V> {
    pub fn new() -> Self {
        Self {
            published: Signal::new(),
        }
    }

    /// Replace the option collection
    ///
    /// Returns `false` (and keeps the previous index) for an empty collection.
    pub fn set_options(&self, options: Vec<FieldOption<V>>) -> bool {
        if options.is_empty() {
            tracing::debug!("ignoring empty option collection");
            return false;
        }
        let index = OptionIndex::build(options);
        tracing::debug!(options = index.len(), "publishing option index");
        self.published.emit(Rc::new(index));
        true
    }

    /// Latest published index, `None` before the first publish
    pub fn current(&self) -> Option<Rc<OptionIndex<V>>> {
        self.published.get()
    }

    pub fn is_populated(&self) -> bool {
        self.published.has_value()
    }

    /// Stream of published indexes
    pub fn published(&self) -> &Signal<Rc<OptionIndex<V>>> {
        &self.published
    }
}

impl<V: OptionValue> Default for OptionSource<V> {
    fn default() -> Self {
        Self::new()
    }
}
