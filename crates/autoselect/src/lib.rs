//! autoselect - option-bound text field adapter
//!
//! Reconciles a free-text input box with a fixed set of `(label, value)`
//! options. The value reported to the host form is always `None` or a value
//! from the current options, never arbitrary typed text.
//!
//! Internally the adapter is a small dataflow graph built on
//! [`autoselect_core`] signals:
//!
//! - [`option`]: option index (value→label, label→value), empty updates ignored
//! - [`events`]: raw UI events normalized into replayed channels
//! - [`reconcile`]: candidate merging and validation into the canonical value
//! - [`label`]: display label projected from the canonical value
//! - [`filter`]: visible menu options from typed text or the current label
//! - [`blur`]: clear / revert decision when the field loses focus
//! - [`field`]: the [`FieldAdapter`] that wires all of the above to a host
//!
//! ```text
//! raw events -> events -> { reconcile, filter }
//!                 reconcile -> canonical value -> label -> text box
//!                 filter -> visible menu
//! ```

pub mod blur;
pub mod config;
pub mod error;
pub mod events;
pub mod field;
pub mod filter;
pub mod label;
pub mod option;
pub mod phase;
pub mod reconcile;
pub mod surface;

pub use blur::BlurAction;
pub use config::{FieldConfig, DEFAULT_DEBOUNCE_TIME_MS};
pub use error::{ConfigError, Result};
pub use field::{BoundField, FieldAdapter, FieldStats, StaticField};
pub use filter::filter_options;
pub use option::{FieldOption, OptionIndex, OptionValue};
pub use phase::{EditState, FieldPhase};
pub use reconcile::{Candidate, CandidateSource, ReconcileStats, TEXT_MATCH_DEBOUNCE};
pub use surface::TextBox;

/// Common imports
pub mod prelude {
    pub use crate::config::FieldConfig;
    pub use crate::field::{BoundField, FieldAdapter, StaticField};
    pub use crate::option::FieldOption;
    pub use crate::phase::{EditState, FieldPhase};
    pub use autoselect_core::{Clock, ManualClock, SystemClock};
}
