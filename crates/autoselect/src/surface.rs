//! Presentational text box
//!
//! A shared string the host renders. The adapter writes projected labels and
//! blur reverts into it; the host writes keystrokes through
//! [`FieldAdapter::input_text`](crate::FieldAdapter::input_text).

use std::cell::RefCell;
use std::rc::Rc;

/// Shared handle to the text box contents (clones share the same buffer)
#[derive(Clone, Debug, Default)]
pub struct TextBox {
    text: Rc<RefCell<String>>,
}

impl TextBox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> String {
        self.text.borrow().clone()
    }

    pub fn set_value(&self, text: impl Into<String>) {
        *self.text.borrow_mut() = text.into();
    }
}
