//! Scripted field sessions
//!
//! A script is a field configuration plus a list of steps:
//!
//! ```toml
//! debounce_time_ms = 0
//! initial_value = "value 2"
//!
//! [[options]]
//! label = "label 1"
//! value = "value 1"
//!
//! [[steps]]
//! action = "focus_text"
//!
//! [[steps]]
//! action = "type"
//! text = "label 1"
//!
//! [[steps]]
//! action = "wait"
//! ms = 300
//! ```
//!
//! Time only moves on `wait` steps, so replays are deterministic.

use std::cell::RefCell;
use std::fmt;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result};
use autoselect::prelude::*;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Script {
    #[serde(flatten)]
    pub field: FieldConfig<String>,
    #[serde(default)]
    pub initial_value: Option<String>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Keystroke leaving `text` in the text box
    Type { text: String },
    Select { value: String },
    /// Host writes the field value (omit `value` to clear)
    Write {
        #[serde(default)]
        value: Option<String>,
    },
    FocusText,
    BlurText,
    OpenMenu,
    CloseMenu,
    /// Advance the clock and run due timers
    Wait { ms: u64 },
    SetOptions { options: Vec<FieldOption<String>> },
    SetDisabled { disabled: bool },
}

impl Step {
    fn name(&self) -> &'static str {
        match self {
            Step::Type { .. } => "type",
            Step::Select { .. } => "select",
            Step::Write { .. } => "write",
            Step::FocusText => "focus_text",
            Step::BlurText => "blur_text",
            Step::OpenMenu => "open_menu",
            Step::CloseMenu => "close_menu",
            Step::Wait { .. } => "wait",
            Step::SetOptions { .. } => "set_options",
            Step::SetDisabled { .. } => "set_disabled",
        }
    }
}

impl Script {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let script: Script = toml::from_str(content)?;
        if script.steps.is_empty() {
            anyhow::bail!("Script has no steps");
        }
        Ok(script)
    }
}

/// Field state after one step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub step: usize,
    pub action: &'static str,
    pub value: Option<String>,
    pub display: String,
    pub menu: Vec<String>,
    pub phase: FieldPhase,
    pub edit: EditState,
    /// Host notifications delivered during this step
    pub changes: Vec<Option<String>>,
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>3} {:<12} value={:<12} display={:<14} {:?}/{:?} menu={:?}",
            self.step,
            self.action,
            format!("{:?}", self.value),
            format!("{:?}", self.display),
            self.phase,
            self.edit,
            self.menu,
        )?;
        if !self.changes.is_empty() {
            write!(f, " changed={:?}", self.changes)?;
        }
        Ok(())
    }
}

/// Run `script` against a fresh adapter and collect a snapshot per step
///
/// Step 0 is the state right after attaching.
pub fn run(script: Script) -> Vec<Snapshot> {
    let clock = Rc::new(ManualClock::new());
    let field = StaticField {
        value: script.initial_value,
        disabled: script.disabled,
        required: false,
    };
    let adapter = FieldAdapter::with_clock(&field, script.field, clock.clone());

    let changes = Rc::new(RefCell::new(Vec::new()));
    let changes_clone = changes.clone();
    adapter.register_on_change(move |value| changes_clone.borrow_mut().push(value.cloned()));

    let mut snapshots = vec![snapshot(&adapter, 0, "attach", Vec::new())];
    for (i, step) in script.steps.into_iter().enumerate() {
        let action = step.name();
        tracing::debug!(step = i + 1, action, "replaying step");
        apply(&adapter, &clock, step);
        let delivered = std::mem::take(&mut *changes.borrow_mut());
        snapshots.push(snapshot(&adapter, i + 1, action, delivered));
    }
    snapshots
}

fn apply(adapter: &FieldAdapter<String>, clock: &ManualClock, step: Step) {
    match step {
        Step::Type { text } => adapter.input_text(text),
        Step::Select { value } => adapter.select(value),
        Step::Write { value } => adapter.write_value(value),
        Step::FocusText => adapter.focus_text(),
        Step::BlurText => adapter.blur_text(),
        Step::OpenMenu => adapter.open_menu(),
        Step::CloseMenu => adapter.close_menu(),
        Step::Wait { ms } => {
            clock.advance_ms(ms);
            adapter.tick();
        }
        Step::SetOptions { options } => {
            if !adapter.set_options(options) {
                tracing::warn!("empty option list ignored");
            }
        }
        Step::SetDisabled { disabled } => adapter.set_disabled_state(disabled),
    }
}

fn snapshot(
    adapter: &FieldAdapter<String>,
    step: usize,
    action: &'static str,
    changes: Vec<Option<String>>,
) -> Snapshot {
    Snapshot {
        step,
        action,
        value: adapter.value(),
        display: adapter.display_text(),
        menu: adapter
            .visible_options()
            .into_iter()
            .map(|option| option.label)
            .collect(),
        phase: adapter.phase(),
        edit: adapter.edit_state(),
        changes,
    }
}
