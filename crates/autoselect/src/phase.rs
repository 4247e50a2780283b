//! Field lifecycle states
//!
//! ```text
//! Uninitialized --attach--> Initializing --first index--> Ready
//!                                   (Ready: Idle <--> Editing)
//! ```
//!
//! Editing is entered on text focus or a keystroke and left on combined blur.

use std::cell::Cell;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FieldPhase {
    #[default]
    Uninitialized,
    /// Wired up, waiting for the first option index
    Initializing,
    Ready,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EditState {
    #[default]
    Idle,
    Editing,
}

/// Events that drive [`PhaseTracker`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhaseEvent {
    Attached,
    IndexPublished,
    EditStarted,
    Blurred,
}

/// Tracks lifecycle phase and edit state of one field
#[derive(Debug, Default)]
pub struct PhaseTracker {
    phase: Cell<FieldPhase>,
    edit: Cell<EditState>,
}

impl PhaseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> FieldPhase {
        self.phase.get()
    }

    pub fn edit_state(&self) -> EditState {
        self.edit.get()
    }

    /// Whether the option index has published at least once
    pub fn is_ready(&self) -> bool {
        self.phase.get() == FieldPhase::Ready
    }

    /// Apply `event`; returns whether anything changed
    pub fn send(&self, event: PhaseEvent) -> bool {
        let (phase, edit) = (self.phase.get(), self.edit.get());
        let (next_phase, next_edit) = match (phase, event) {
            (FieldPhase::Uninitialized, PhaseEvent::Attached) => (FieldPhase::Initializing, edit),
            (FieldPhase::Initializing, PhaseEvent::IndexPublished) => (FieldPhase::Ready, edit),
            (FieldPhase::Ready, PhaseEvent::EditStarted) => (phase, EditState::Editing),
            (FieldPhase::Ready, PhaseEvent::Blurred) => (phase, EditState::Idle),
            _ => (phase, edit),
        };

        if (next_phase, next_edit) == (phase, edit) {
            return false;
        }
        tracing::trace!(
            ?event,
            from = ?(phase, edit),
            to = ?(next_phase, next_edit),
            "phase transition"
        );
        self.phase.set(next_phase);
        self.edit.set(next_edit);
        true
    }
}
