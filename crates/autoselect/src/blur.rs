//! Blur reconciliation policy
//!
//! Applied when the field loses combined focus:
//! - empty text box: explicit clear, the value becomes the empty marker
//! - anything else: the text box reverts to the last valid label and the
//!   value is left alone, so an unfinished edit never replaces a good value
//!
//! Either way the label is republished so the menu filters on it again.

use std::rc::Rc;

use crate::label::LabelProjector;
use crate::option::OptionValue;
use crate::reconcile::Reconciler;
use crate::surface::TextBox;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlurAction {
    Clear,
    Revert(String),
}

/// Decide what a blur does given the text box contents
pub fn decide(text: &str, last_label: &str) -> BlurAction {
    if text.is_empty() {
        BlurAction::Clear
    } else {
        BlurAction::Revert(last_label.to_string())
    }
}

pub struct BlurPolicy<V: OptionValue> {
    text_box: TextBox,
    reconciler: Rc<Reconciler<V>>,
    labels: Rc<LabelProjector<V>>,
}

impl<V: OptionValue> BlurPolicy<V> {
    pub fn new(
        text_box: TextBox,
        reconciler: Rc<Reconciler<V>>,
        labels: Rc<LabelProjector<V>>,
    ) -> Self {
        Self {
            text_box,
            reconciler,
            labels,
        }
    }

    /// Read the text box now and apply the resulting action
    pub fn apply(&self) -> BlurAction {
        let action = decide(&self.text_box.value(), &self.labels.last_label());
        match &action {
            BlurAction::Clear => {
                tracing::debug!("blur with empty text, clearing value");
                self.reconciler.clear();
                self.text_box.set_value("");
            }
            BlurAction::Revert(label) => {
                tracing::debug!(%label, "blur with pending text, reverting display");
                self.text_box.set_value(label.clone());
            }
        }
        self.labels.republish();
        action
    }
}
