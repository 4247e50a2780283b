//! Field adapter
//!
//! [`FieldAdapter`] binds a host form field to a text box and an option menu.
//! It exposes the usual value-accessor surface (`write_value`,
//! `register_on_change`, `register_on_touched`, `set_disabled_state`) and
//! raw UI event entry points, and guarantees that the value it reports back
//! to the host is always `None` or an option value.
//!
//! # Example
//!
//! ```rust
//! use autoselect::prelude::*;
//!
//! let field = StaticField::with_value("value 2");
//! let config = FieldConfig::new(vec![
//!     FieldOption::new("label 1", "value 1"),
//!     FieldOption::new("label 2", "value 2"),
//! ])
//! .debounce_time_ms(0);
//!
//! let adapter = FieldAdapter::attach(&field, config);
//! assert_eq!(adapter.display_text(), "label 2");
//!
//! adapter.select("value 1");
//! assert_eq!(adapter.value(), Some("value 1"));
//! assert_eq!(adapter.display_text(), "label 1");
//! ```
//!
//! Typed text is matched against labels after a fixed quiet period, so hosts
//! must call [`FieldAdapter::tick`] from their event loop (or when
//! [`FieldAdapter::next_deadline`] passes) for typed matches to land.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Instant;

use autoselect_core::{Clock, Scope, Signal, SystemClock};

use crate::blur::BlurPolicy;
use crate::config::FieldConfig;
use crate::events::FieldEvents;
use crate::filter::FilterEngine;
use crate::label::LabelProjector;
use crate::option::{FieldOption, OptionIndex, OptionSource, OptionValue};
use crate::phase::{EditState, FieldPhase, PhaseEvent, PhaseTracker};
use crate::reconcile::{ReconcileStats, Reconciler};
use crate::surface::TextBox;

/// The host form control the adapter is attached to
///
/// Read once at attach time. Later writes go through
/// [`FieldAdapter::write_value`] and [`FieldAdapter::set_disabled_state`].
pub trait BoundField<V> {
    fn value(&self) -> Option<V>;

    fn is_disabled(&self) -> bool {
        false
    }

    /// Whether the host validates the field as required
    fn is_required(&self) -> bool {
        false
    }
}

/// Plain in-memory [`BoundField`]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StaticField<V> {
    pub value: Option<V>,
    pub disabled: bool,
    pub required: bool,
}

impl<V> StaticField<V> {
    pub fn empty() -> Self {
        Self {
            value: None,
            disabled: false,
            required: false,
        }
    }

    pub fn with_value(value: V) -> Self {
        Self {
            value: Some(value),
            ..Self::empty()
        }
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}

impl<V: Clone> BoundField<V> for StaticField<V> {
    fn value(&self) -> Option<V> {
        self.value.clone()
    }

    fn is_disabled(&self) -> bool {
        self.disabled
    }

    fn is_required(&self) -> bool {
        self.required
    }
}

type ChangeCallback<V> = Rc<dyn Fn(Option<&V>)>;
type TouchedCallback = Rc<dyn Fn()>;

/// Callbacks registered by the host form
struct HostCallbacks<V> {
    on_change: RefCell<Option<ChangeCallback<V>>>,
    on_touched: RefCell<Option<TouchedCallback>>,
}

impl<V> HostCallbacks<V> {
    fn new() -> Self {
        Self {
            on_change: RefCell::new(None),
            on_touched: RefCell::new(None),
        }
    }

    // Callbacks are cloned out so they may re-register themselves
    fn notify_change(&self, value: Option<&V>) {
        let callback = self.on_change.borrow().clone();
        if let Some(callback) = callback {
            callback(value);
        }
    }

    fn notify_touched(&self) {
        let callback = self.on_touched.borrow().clone();
        if let Some(callback) = callback {
            callback();
        }
    }
}

/// Diagnostics snapshot
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldStats {
    pub reconcile: ReconcileStats,
    pub subscriptions: usize,
    pub option_count: usize,
}

/// Adapter between a host form field, a text box and an option menu
pub struct FieldAdapter<V: OptionValue> {
    options: OptionSource<V>,
    events: FieldEvents<V>,
    reconciler: Rc<Reconciler<V>>,
    labels: Rc<LabelProjector<V>>,
    filter: Rc<FilterEngine<V>>,
    text_box: TextBox,
    phase: Rc<PhaseTracker>,
    host: Rc<HostCallbacks<V>>,
    bound_value: Rc<RefCell<Option<V>>>,
    disabled: Cell<bool>,
    required: bool,
    clock: Rc<dyn Clock>,
    scope: Scope,
}

impl<V: OptionValue> FieldAdapter<V> {
    /// Attach to `field` using the wall clock
    pub fn attach(field: &impl BoundField<V>, config: FieldConfig<V>) -> Self {
        Self::with_clock(field, config, Rc::new(SystemClock))
    }

    /// Attach to `field`, reading time from `clock`
    pub fn with_clock(
        field: &impl BoundField<V>,
        config: FieldConfig<V>,
        clock: Rc<dyn Clock>,
    ) -> Self {
        let debounce = config.debounce_time();
        let adapter = Self {
            options: OptionSource::new(),
            events: FieldEvents::new(),
            reconciler: Reconciler::new(Rc::clone(&clock)),
            labels: LabelProjector::new(),
            filter: FilterEngine::new(debounce, Rc::clone(&clock)),
            text_box: TextBox::new(),
            phase: Rc::new(PhaseTracker::new()),
            host: Rc::new(HostCallbacks::new()),
            bound_value: Rc::new(RefCell::new(field.value())),
            disabled: Cell::new(field.is_disabled()),
            required: field.is_required(),
            clock,
            scope: Scope::new(),
        };
        adapter.connect();

        adapter.options.set_options(config.options);
        // An empty field seeds the canonical value too, so a later
        // `write_value(None)` is recognised as a rewrite
        adapter.events.external_value.emit(field.value());
        tracing::debug!(
            phase = ?adapter.phase.phase(),
            disabled = adapter.disabled.get(),
            required = adapter.required,
            "field attached"
        );
        adapter
    }

    fn connect(&self) {
        let scope = &self.scope;
        self.phase.send(PhaseEvent::Attached);

        // Readiness must flip before anything else reacts to the first index
        let phase = Rc::clone(&self.phase);
        scope.subscribe(self.options.published(), move |_| {
            if phase.send(PhaseEvent::IndexPublished) {
                tracing::debug!("option index ready");
            }
        });

        self.events.connect(scope);
        self.reconciler.connect(&self.events, &self.options, scope);
        self.labels
            .connect(self.reconciler.canonical(), &self.options, scope);

        let text_box = self.text_box.clone();
        scope.subscribe(self.labels.label(), move |label| {
            text_box.set_value(label.clone());
        });

        self.filter.connect(
            &self.events.text_input,
            self.labels.label(),
            &self.options,
            scope,
        );

        let host = Rc::clone(&self.host);
        let bound = Rc::clone(&self.bound_value);
        let phase = Rc::clone(&self.phase);
        scope.subscribe_changes(self.reconciler.canonical(), move |value| {
            *bound.borrow_mut() = value.clone();
            if !phase.is_ready() {
                tracing::trace!("options not loaded, suppressing change notification");
                return;
            }
            host.notify_change(value.as_ref());
        });

        let blur = BlurPolicy::new(
            self.text_box.clone(),
            Rc::clone(&self.reconciler),
            Rc::clone(&self.labels),
        );
        let host = Rc::clone(&self.host);
        let phase = Rc::clone(&self.phase);
        scope.subscribe_changes(self.events.unfocused(), move |unfocused| {
            if !*unfocused {
                return;
            }
            phase.send(PhaseEvent::Blurred);
            let action = blur.apply();
            tracing::trace!(?action, "field touched");
            host.notify_touched();
        });
    }

    // =========================================================================
    // VALUE ACCESSOR
    // =========================================================================

    /// The host set the field value
    pub fn write_value(&self, value: Option<V>) {
        *self.bound_value.borrow_mut() = value.clone();
        self.events.external_value.emit(value);
    }

    /// Called with every accepted value change once options have loaded
    pub fn register_on_change<F>(&self, callback: F)
    where
        F: Fn(Option<&V>) + 'static,
    {
        *self.host.on_change.borrow_mut() = Some(Rc::new(callback));
    }

    /// Called on every combined blur
    pub fn register_on_touched<F>(&self, callback: F)
    where
        F: Fn() + 'static,
    {
        *self.host.on_touched.borrow_mut() = Some(Rc::new(callback));
    }

    /// While disabled, typing, focusing and selecting are ignored
    pub fn set_disabled_state(&self, disabled: bool) {
        if self.disabled.replace(disabled) != disabled {
            tracing::debug!(disabled, "field disabled state changed");
        }
    }

    // =========================================================================
    // UI EVENTS
    // =========================================================================

    /// Replace the option list; an empty list is ignored
    pub fn set_options(&self, options: Vec<FieldOption<V>>) -> bool {
        self.options.set_options(options)
    }

    /// A keystroke left `text` in the text box
    pub fn input_text(&self, text: impl Into<String>) {
        if self.disabled.get() {
            return;
        }
        let text = text.into();
        self.text_box.set_value(text.clone());
        self.phase.send(PhaseEvent::EditStarted);
        self.events.text_input.emit(text);
    }

    pub fn focus_text(&self) {
        if self.disabled.get() {
            return;
        }
        self.phase.send(PhaseEvent::EditStarted);
        self.events.text_focus.emit(true);
    }

    pub fn blur_text(&self) {
        self.events.text_focus.emit(false);
    }

    pub fn open_menu(&self) {
        if self.disabled.get() {
            return;
        }
        self.events.menu_focus.emit(true);
    }

    pub fn close_menu(&self) {
        self.events.menu_focus.emit(false);
    }

    /// The user picked the option carrying `value`
    pub fn select(&self, value: V) {
        if self.disabled.get() {
            return;
        }
        self.events.selection.emit(value);
    }

    /// Deliver every debounced value that is due
    pub fn tick(&self) {
        let now = self.clock.now();
        self.reconciler.poll(now);
        self.filter.poll(now);
    }

    /// Earliest instant at which [`tick`](Self::tick) has work to do
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.reconciler.next_deadline(), self.filter.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Release every internal subscription
    ///
    /// The adapter stops reacting to events; accessors keep their last state.
    pub fn teardown(&self) {
        self.scope.teardown();
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// Value the host field holds
    ///
    /// This is the last accepted value, or the externally written value if
    /// it has not (yet) matched an option.
    pub fn value(&self) -> Option<V> {
        self.bound_value.borrow().clone()
    }

    /// Replayed stream of accepted values
    pub fn canonical(&self) -> &Signal<Option<V>> {
        self.reconciler.canonical()
    }

    /// Replayed stream of display labels
    pub fn label(&self) -> &Signal<String> {
        self.labels.label()
    }

    /// Current text box contents
    pub fn display_text(&self) -> String {
        self.text_box.value()
    }

    pub fn text_box(&self) -> &TextBox {
        &self.text_box
    }

    /// Replayed stream of visible menu options
    pub fn filtered_options(&self) -> &Signal<Vec<FieldOption<V>>> {
        self.filter.filtered()
    }

    /// Currently visible menu options (empty before options load)
    pub fn visible_options(&self) -> Vec<FieldOption<V>> {
        self.filter.filtered().get().unwrap_or_default()
    }

    /// Replayed stream of menu selections
    pub fn selection(&self) -> &Signal<V> {
        &self.events.selection
    }

    pub fn options(&self) -> Option<Rc<OptionIndex<V>>> {
        self.options.current()
    }

    /// Replayed stream of option indexes
    pub fn published_options(&self) -> &Signal<Rc<OptionIndex<V>>> {
        self.options.published()
    }

    pub fn phase(&self) -> FieldPhase {
        self.phase.phase()
    }

    pub fn edit_state(&self) -> EditState {
        self.phase.edit_state()
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled.get()
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn stats(&self) -> FieldStats {
        FieldStats {
            reconcile: self.reconciler.stats(),
            subscriptions: self.scope.len(),
            option_count: self.options.current().map_or(0, |index| index.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::TEXT_MATCH_DEBOUNCE;
    use autoselect_core::ManualClock;

    type Adapter = FieldAdapter<&'static str>;

    fn numbered() -> Vec<FieldOption<&'static str>> {
        vec![
            FieldOption::new("label 1", "value 1"),
            FieldOption::new("label 2", "value 2"),
            FieldOption::new("label 12", "value 12"),
        ]
    }

    fn setup(value: Option<&'static str>) -> (Adapter, Rc<ManualClock>) {
        setup_with(value, numbered())
    }

    fn setup_with(
        value: Option<&'static str>,
        options: Vec<FieldOption<&'static str>>,
    ) -> (Adapter, Rc<ManualClock>) {
        let clock = Rc::new(ManualClock::new());
        let field = StaticField {
            value,
            ..StaticField::empty()
        };
        let config = FieldConfig::new(options).debounce_time_ms(0);
        let adapter = FieldAdapter::with_clock(&field, config, clock.clone());
        (adapter, clock)
    }

    fn change_log(adapter: &Adapter) -> Rc<RefCell<Vec<Option<&'static str>>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let log_clone = log.clone();
        adapter.register_on_change(move |v| log_clone.borrow_mut().push(v.copied()));
        log
    }

    fn labels(adapter: &Adapter) -> Vec<String> {
        adapter
            .visible_options()
            .into_iter()
            .map(|o| o.label)
            .collect()
    }

    fn settle(adapter: &Adapter, clock: &ManualClock) {
        clock.advance(TEXT_MATCH_DEBOUNCE);
        adapter.tick();
    }

    #[test]
    fn test_initial_value_and_selection() {
        let (adapter, _clock) = setup(Some("value 2"));
        assert_eq!(adapter.phase(), FieldPhase::Ready);
        assert_eq!(adapter.display_text(), "label 2");

        adapter.select("value 1");
        assert_eq!(adapter.display_text(), "label 1");
        assert_eq!(adapter.value(), Some("value 1"));
        assert_eq!(adapter.canonical().get(), Some(Some("value 1")));
    }

    #[test]
    fn test_starts_blank_without_value() {
        let (adapter, _clock) = setup(None);
        assert_eq!(adapter.display_text(), "");
        assert_eq!(adapter.value(), None);
        assert_eq!(adapter.canonical().get(), Some(None));
        assert_eq!(adapter.visible_options().len(), 3);
    }

    #[test]
    fn test_selection_round_trip() {
        let (adapter, _clock) = setup(None);
        for option in numbered() {
            adapter.select(option.value);
            assert_eq!(adapter.display_text(), option.label);
            assert_eq!(adapter.value(), Some(option.value));
        }
    }

    #[test]
    fn test_typed_label_commits_after_quiet_period() {
        let (adapter, clock) = setup(Some("value 2"));
        let log = change_log(&adapter);

        adapter.focus_text();
        adapter.input_text("label 1");
        adapter.input_text("label 12");
        assert_eq!(adapter.value(), Some("value 2"));
        assert_eq!(
            adapter.next_deadline(),
            Some(clock.now() + TEXT_MATCH_DEBOUNCE)
        );

        settle(&adapter, &clock);
        assert_eq!(adapter.value(), Some("value 12"));
        assert_eq!(adapter.display_text(), "label 12");
        assert_eq!(*log.borrow(), vec![Some("value 12")]);
        assert_eq!(adapter.next_deadline(), None);
    }

    #[test]
    fn test_filter_follows_typed_text() {
        let (adapter, _clock) = setup(None);
        adapter.input_text("1");
        assert_eq!(labels(&adapter), vec!["label 1", "label 12"]);

        adapter.input_text("oh no");
        assert!(labels(&adapter).is_empty());
    }

    #[test]
    fn test_filter_follows_label_when_idle() {
        let (adapter, _clock) = setup(Some("value 12"));
        assert_eq!(labels(&adapter), vec!["label 12"]);

        adapter.select("value 2");
        assert_eq!(labels(&adapter), vec!["label 2"]);
    }

    #[test]
    fn test_blur_with_empty_text_clears() {
        let (adapter, _clock) = setup(Some("value 2"));
        let log = change_log(&adapter);

        adapter.focus_text();
        adapter.input_text("");
        adapter.blur_text();

        assert_eq!(adapter.value(), None);
        assert_eq!(adapter.display_text(), "");
        assert_eq!(adapter.canonical().get(), Some(None));
        assert_eq!(*log.borrow(), vec![None]);
    }

    #[test]
    fn test_blur_with_invalid_text_reverts() {
        let (adapter, clock) = setup(Some("value 2"));
        let log = change_log(&adapter);

        adapter.focus_text();
        adapter.input_text("not an option");
        adapter.blur_text();
        assert_eq!(adapter.display_text(), "label 2");
        assert_eq!(adapter.value(), Some("value 2"));

        settle(&adapter, &clock);
        assert_eq!(adapter.value(), Some("value 2"));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_blur_revert_restores_menu() {
        let (adapter, _clock) = setup(Some("value 2"));
        adapter.focus_text();
        adapter.input_text("oh no");
        assert!(labels(&adapter).is_empty());

        adapter.blur_text();
        assert_eq!(adapter.display_text(), "label 2");
        assert_eq!(adapter.edit_state(), EditState::Idle);
        assert_eq!(labels(&adapter), vec!["label 2"]);
    }

    #[test]
    fn test_blur_clear_restores_full_menu() {
        let (adapter, _clock) = setup(None);
        adapter.focus_text();
        adapter.input_text("12");
        adapter.open_menu();
        adapter.text_box().set_value("");
        adapter.blur_text();
        adapter.close_menu();

        assert_eq!(adapter.value(), None);
        assert_eq!(labels(&adapter).len(), 3);
    }

    #[test]
    fn test_blur_waits_for_menu() {
        let (adapter, _clock) = setup(Some("value 2"));
        adapter.focus_text();
        adapter.open_menu();
        adapter.input_text("");
        adapter.blur_text();
        assert_eq!(adapter.value(), Some("value 2"));
        assert_eq!(adapter.edit_state(), EditState::Editing);

        adapter.close_menu();
        assert_eq!(adapter.value(), None);
        assert_eq!(adapter.edit_state(), EditState::Idle);
    }

    #[test]
    fn test_touched_on_blur() {
        let (adapter, _clock) = setup(Some("value 1"));
        let touched = Rc::new(Cell::new(0));
        let touched_clone = touched.clone();
        adapter.register_on_touched(move || touched_clone.set(touched_clone.get() + 1));

        adapter.focus_text();
        adapter.blur_text();
        adapter.blur_text();
        assert_eq!(touched.get(), 1);
        // Non-empty text box: nothing changes
        assert_eq!(adapter.value(), Some("value 1"));
        assert_eq!(adapter.display_text(), "label 1");
    }

    #[test]
    fn test_unmatched_startup_value() {
        let (adapter, _clock) = setup(Some("missing"));
        assert_eq!(adapter.display_text(), "");
        assert_eq!(adapter.value(), Some("missing"));
        assert!(!adapter.canonical().has_value());

        adapter.select("value 1");
        assert_eq!(adapter.value(), Some("value 1"));
    }

    #[test]
    fn test_rewriting_current_value_is_silent() {
        let (adapter, _clock) = setup(Some("value 2"));
        let log = change_log(&adapter);

        adapter.write_value(Some("value 2"));
        assert!(log.borrow().is_empty());
        assert_eq!(adapter.display_text(), "label 2");

        adapter.write_value(Some("value 1"));
        assert_eq!(*log.borrow(), vec![Some("value 1")]);
    }

    #[test]
    fn test_rewriting_empty_value_is_silent() {
        let (adapter, _clock) = setup(None);
        let log = change_log(&adapter);

        adapter.write_value(None);
        assert!(log.borrow().is_empty());
        assert_eq!(adapter.display_text(), "");

        adapter.write_value(Some("value 2"));
        adapter.write_value(None);
        assert_eq!(*log.borrow(), vec![Some("value 2"), None]);
    }

    #[test]
    fn test_notifications_wait_for_options() {
        let (adapter, _clock) = setup_with(None, Vec::new());
        assert_eq!(adapter.phase(), FieldPhase::Initializing);
        let log = change_log(&adapter);

        adapter.focus_text();
        adapter.blur_text();
        assert_eq!(adapter.canonical().get(), Some(None));
        assert!(log.borrow().is_empty());

        adapter.write_value(Some("value 12"));
        assert_eq!(adapter.display_text(), "");

        assert!(adapter.set_options(numbered()));
        assert_eq!(adapter.phase(), FieldPhase::Ready);
        assert_eq!(adapter.display_text(), "label 12");
        assert_eq!(*log.borrow(), vec![Some("value 12")]);
    }

    #[test]
    fn test_empty_options_are_ignored() {
        let (adapter, _clock) = setup(Some("value 1"));
        assert!(!adapter.set_options(Vec::new()));
        assert_eq!(adapter.stats().option_count, 3);
        assert_eq!(adapter.display_text(), "label 1");
    }

    #[test]
    fn test_options_dropping_current_value_is_lazy() {
        let (adapter, _clock) = setup(Some("value 1"));
        adapter.set_options(vec![FieldOption::new("label 2", "value 2")]);

        assert_eq!(adapter.value(), Some("value 1"));
        assert_eq!(adapter.display_text(), "");

        adapter.select("value 2");
        assert_eq!(adapter.display_text(), "label 2");
    }

    #[test]
    fn test_disabled_ignores_input() {
        let clock = Rc::new(ManualClock::new());
        let field = StaticField::with_value("value 1").disabled(true).required(true);
        let config = FieldConfig::new(numbered()).debounce_time_ms(0);
        let adapter = FieldAdapter::with_clock(&field, config, clock);
        assert!(adapter.is_disabled());
        assert!(adapter.is_required());

        adapter.select("value 2");
        adapter.input_text("label 12");
        assert_eq!(adapter.value(), Some("value 1"));
        assert_eq!(adapter.display_text(), "label 1");

        adapter.write_value(Some("value 2"));
        assert_eq!(adapter.value(), Some("value 2"));

        adapter.set_disabled_state(false);
        adapter.select("value 12");
        assert_eq!(adapter.value(), Some("value 12"));
    }

    #[test]
    fn test_teardown_releases_subscriptions() {
        let (adapter, _clock) = setup(Some("value 1"));
        assert!(adapter.stats().subscriptions > 0);

        adapter.teardown();
        assert_eq!(adapter.stats().subscriptions, 0);
        assert_eq!(adapter.selection().listener_count(), 0);

        adapter.select("value 2");
        assert_eq!(adapter.value(), Some("value 1"));
    }

    #[test]
    fn test_menu_debounce_is_independent() {
        let clock = Rc::new(ManualClock::new());
        let field = StaticField::empty();
        let config = FieldConfig::new(numbered()).debounce_time_ms(100);
        let adapter = FieldAdapter::with_clock(&field, config, clock.clone());
        clock.advance_ms(100);
        adapter.tick();
        assert_eq!(labels(&adapter).len(), 3);

        adapter.input_text("12");
        assert_eq!(labels(&adapter).len(), 3);
        clock.advance_ms(100);
        adapter.tick();
        assert_eq!(labels(&adapter), vec!["label 12"]);
        assert_eq!(adapter.value(), None);

        clock.advance_ms(200);
        adapter.tick();
        assert_eq!(adapter.value(), None);
    }

    #[test]
    fn test_accepted_values_come_from_current_index() {
        let (adapter, clock) = setup(None);
        let option_sets = [
            numbered(),
            vec![FieldOption::new("label 2", "value 2")],
            vec![
                FieldOption::new("label 12", "value 12"),
                FieldOption::new("label 3", "value 3"),
            ],
        ];
        let values = ["value 1", "value 2", "value 3", "value 12", "bogus"];
        let texts = ["label 1", "label 3", "", "zzz", "label 12"];

        let published = adapter.published_options().clone();
        let violations = Rc::new(RefCell::new(Vec::new()));
        let violations_clone = violations.clone();
        let _check = adapter.canonical().subscribe_changes(move |value| {
            if let Some(value) = value {
                let offered = published
                    .get()
                    .is_some_and(|index| index.contains_value(value));
                if !offered {
                    violations_clone.borrow_mut().push(*value);
                }
            }
        });

        // Small LCG keeps the event sequence deterministic
        let mut seed: u64 = 0x2545_f491;
        let mut next = |n: usize| {
            seed = seed
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (seed >> 33) as usize % n
        };

        for _ in 0..500 {
            match next(8) {
                0 => {
                    adapter.set_options(option_sets[next(option_sets.len())].clone());
                }
                1 => adapter.select(values[next(values.len())]),
                2 => adapter.write_value(Some(values[next(values.len())])),
                3 => adapter.input_text(texts[next(texts.len())]),
                4 => adapter.focus_text(),
                5 => adapter.blur_text(),
                6 => adapter.open_menu(),
                _ => {
                    clock.advance_ms(next(400) as u64);
                    adapter.tick();
                }
            }
            assert_ne!(adapter.canonical().get(), Some(Some("bogus")));
        }

        assert!(violations.borrow().is_empty(), "{:?}", violations.borrow());
        assert!(adapter.stats().reconcile.accepted > 0);
    }
}
