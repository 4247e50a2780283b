//! Input event normalizer
//!
//! Turns raw UI events into typed channels. Every channel replays its latest
//! value to late subscribers; the two focus flags always hold a value
//! (initially `false`).
//!
//! The derived `unfocused` flag is `true` when neither the text box nor the
//! menu holds focus. It only emits on change, so listeners that skip the
//! replay (see [`Signal::subscribe_changes`]) observe exactly the combined
//! blur transitions. The initial both-unfocused state is not a transition.

use autoselect_core::{focus_signal, Scope, Signal};

use crate::option::OptionValue;

/// Typed input channels of one field
pub struct FieldEvents<V: OptionValue> {
    /// Value written from outside (`None` is the empty marker)
    pub external_value: Signal<Option<V>>,
    /// Raw text box contents after each keystroke
    pub text_input: Signal<String>,
    /// Value of the option picked from the menu
    pub selection: Signal<V>,
    pub menu_focus: Signal<bool>,
    pub text_focus: Signal<bool>,
    unfocused: Signal<bool>,
}

impl<V: OptionValue> FieldEvents<V> {
    pub fn new() -> Self {
        Self {
            external_value: Signal::new(),
            text_input: Signal::new(),
            selection: Signal::new(),
            menu_focus: focus_signal(),
            text_focus: focus_signal(),
            unfocused: Signal::with_value(true),
        }
    }

    /// Derive the combined focus flag for the lifetime of `scope`
    pub fn connect(&self, scope: &Scope) {
        for focus in [&self.menu_focus, &self.text_focus] {
            let menu = self.menu_focus.clone();
            let text = self.text_focus.clone();
            let unfocused = self.unfocused.clone();
            scope.subscribe_changes(focus, move |_| {
                let menu_focused = menu.get().unwrap_or(false);
                let text_focused = text.get().unwrap_or(false);
                unfocused.emit_distinct(!menu_focused && !text_focused);
            });
        }
    }

    /// `true` while neither the text box nor the menu is focused
    pub fn unfocused(&self) -> &Signal<bool> {
        &self.unfocused
    }

    /// Whether the text box or the menu currently holds focus
    pub fn has_focus(&self) -> bool {
        !self.unfocused.get().unwrap_or(true)
    }
}

impl<V: OptionValue> Default for FieldEvents<V> {
    fn default() -> Self {
        Self::new()
    }
}
