//! Select component for dropdown value selection
//!
//! A headless select: the control owns its options, the current selection and
//! an open/closed + enabled/disabled state machine, and mirrors them into an
//! [`ElementTree`] when mounted. It takes part in forms through
//! [`ValueAccessor`].
//!
//! # Example
//!
//! ```rust
//! use dropline_cn::prelude::*;
//! use dropline_core::{ElementTree, EventDispatcher};
//!
//! let mut tree = ElementTree::new(800.0, 600.0).unwrap();
//! let dispatcher = EventDispatcher::new();
//!
//! let fruit = cn::select()
//!     .placeholder("Choose a fruit...")
//!     .option("apple", "Apple")
//!     .option("banana", "Banana")
//!     .build();
//!
//! // Mounting selects the first option
//! let root = tree.root();
//! fruit.mount(&mut tree, root, &dispatcher).unwrap();
//! assert_eq!(fruit.selected_option().value, "apple");
//!
//! // Different sizes
//! let _large = cn::select().size(SelectSize::Large).build();
//!
//! // Disabled state
//! let locked = cn::select().disabled(true).build();
//! locked.toggle();
//! assert!(!locked.is_open());
//! ```
//!
//! # Element structure
//!
//! ```text
//! select              root, containment boundary for outside clicks
//! ├── select-trigger  CLICK toggles the list
//! └── select-panel    hidden while closed
//!     └── select-option × N   CLICK selects the row's value
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use dropline_core::events::{event_types, EventDispatcher, ListenerGuard};
use dropline_core::fsm::{StateId, StateMachine};
use dropline_core::tree::{ElementId, ElementTree};
use dropline_core::{Callback, CallbackSlot, Emitter, TreeError};
use dropline_forms::ValueAccessor;
use serde::{Deserialize, Serialize};
use taffy::prelude::{Dimension, Display, FlexDirection, Size, Style};

/// An option in the select dropdown
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectOption {
    /// The display label
    pub label: String,
    /// The value reported to the form when selected
    pub value: String,
}

impl SelectOption {
    /// Create a new option with value and label
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }

    /// The "nothing selected" option
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.label.is_empty() && self.value.is_empty()
    }
}

/// Find the first option carrying `value`, or the empty option
pub fn resolve_option(options: &[SelectOption], value: &str) -> SelectOption {
    options
        .iter()
        .find(|option| option.value == value)
        .cloned()
        .unwrap_or_default()
}

/// Select states (combines visibility with disablement)
pub mod states {
    /// Closed + enabled
    pub const CLOSED: u32 = 0;
    /// Open + enabled
    pub const OPEN: u32 = 1;
    /// Closed + disabled
    pub const CLOSED_DISABLED: u32 = 10;
    /// Open + disabled (disabling does not close the list)
    pub const OPEN_DISABLED: u32 = 11;
}

/// Select state machine events
pub mod select_events {
    /// The trigger was activated
    pub const TOGGLE: u32 = 1;
    /// Something outside the select was activated
    pub const DISMISS: u32 = 2;
    pub const DISABLE: u32 = 3;
    pub const ENABLE: u32 = 4;
}

/// Select size variants
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectSize {
    /// Small select (height: 32px)
    Small,
    /// Medium select (height: 40px)
    #[default]
    Medium,
    /// Large select (height: 48px)
    Large,
}

impl SelectSize {
    /// Height of the trigger and of each option row
    pub fn height(&self) -> f32 {
        match self {
            SelectSize::Small => 32.0,
            SelectSize::Medium => 40.0,
            SelectSize::Large => 48.0,
        }
    }
}

/// Select configuration
#[derive(Clone, Debug)]
pub struct SelectConfig {
    /// Trigger text while nothing is selected
    pub placeholder: String,
    pub size: SelectSize,
    /// Width of the control
    pub width: f32,
    /// Element key prefix; when set, the root, trigger and option rows can be
    /// looked up with [`ElementTree::find`]
    pub key: Option<String>,
}

impl Default for SelectConfig {
    fn default() -> Self {
        Self {
            placeholder: "Select an option".to_string(),
            size: SelectSize::Medium,
            width: 200.0,
            key: None,
        }
    }
}

/// One row of the presentation snapshot
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionRow {
    pub label: String,
    pub value: String,
    pub selected: bool,
}

/// Presentation snapshot of a select
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectView {
    /// Selected label, or the placeholder
    pub trigger_text: String,
    /// Whether `trigger_text` is the placeholder
    pub showing_placeholder: bool,
    pub open: bool,
    pub disabled: bool,
    pub rows: Vec<OptionRow>,
}

impl fmt::Display for SelectView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.trigger_text)?;
        if self.open {
            write!(f, " open")?;
        }
        if self.disabled {
            write!(f, " disabled")?;
        }
        if self.open {
            for row in &self.rows {
                let marker = if row.selected { "(*)" } else { "( )" };
                write!(f, "\n  {} {} <{}>", marker, row.label, row.value)?;
            }
        }
        Ok(())
    }
}

struct SelectState {
    options: Vec<SelectOption>,
    selected: SelectOption,
    fsm: StateMachine,
    touched: bool,
    needs_render: bool,
    /// The first mount already picked a default
    auto_selected: bool,
}

/// Elements owned by a mounted select
struct Mounted {
    root: ElementId,
    trigger: ElementId,
    panel: ElementId,
    rows: Vec<(SelectOption, ElementId)>,
    /// Document click listener, released on unmount
    listener: ListenerGuard,
}

struct SelectInner {
    config: SelectConfig,
    state: RefCell<SelectState>,
    on_change: CallbackSlot<String>,
    on_touched: CallbackSlot<()>,
    selected_value: Emitter<String>,
    mounted: RefCell<Option<Mounted>>,
}

/// A dropdown select control
///
/// Cheap to clone; clones share the same state. Element handlers and the
/// document listener hold weak references, so dropping the last clone tears
/// the control down and releases its listener.
#[derive(Clone)]
pub struct Select {
    inner: Rc<SelectInner>,
}

fn upgrade(weak: &Weak<SelectInner>) -> Option<Select> {
    weak.upgrade().map(|inner| Select { inner })
}

impl Select {
    /// Create a select with no options
    pub fn new(config: SelectConfig) -> Self {
        Self::with_options(config, Vec::new())
    }

    pub fn with_options(config: SelectConfig, options: Vec<SelectOption>) -> Self {
        Self {
            inner: Rc::new(SelectInner {
                config,
                state: RefCell::new(SelectState {
                    options,
                    selected: SelectOption::empty(),
                    fsm: Self::create_fsm(),
                    touched: false,
                    needs_render: true,
                    auto_selected: false,
                }),
                on_change: CallbackSlot::new(),
                on_touched: CallbackSlot::new(),
                selected_value: Emitter::new(),
                mounted: RefCell::new(None),
            }),
        }
    }

    /// Create the select FSM
    ///
    /// Disabled states have no `TOGGLE` transition, so toggling while
    /// disabled is ignored.
    fn create_fsm() -> StateMachine {
        use select_events::*;
        use states::*;

        StateMachine::builder(CLOSED)
            .on(CLOSED, TOGGLE, OPEN)
            .on(OPEN, TOGGLE, CLOSED)
            // Outside clicks close in either enablement
            .on(OPEN, DISMISS, CLOSED)
            .on(OPEN_DISABLED, DISMISS, CLOSED_DISABLED)
            .on(CLOSED, DISABLE, CLOSED_DISABLED)
            .on(OPEN, DISABLE, OPEN_DISABLED)
            .on(CLOSED_DISABLED, ENABLE, CLOSED)
            .on(OPEN_DISABLED, ENABLE, OPEN)
            .build()
    }

    pub fn config(&self) -> &SelectConfig {
        &self.inner.config
    }

    /// Current FSM state (see [`states`])
    pub fn state(&self) -> StateId {
        self.inner.state.borrow().fsm.current()
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state(), states::OPEN | states::OPEN_DISABLED)
    }

    pub fn is_disabled(&self) -> bool {
        self.state() >= states::CLOSED_DISABLED
    }

    /// Whether the user has selected a value at least once
    pub fn is_touched(&self) -> bool {
        self.inner.state.borrow().touched
    }

    /// Whether state changed since the view was last synchronized
    pub fn needs_render(&self) -> bool {
        self.inner.state.borrow().needs_render
    }

    pub fn options(&self) -> Vec<SelectOption> {
        self.inner.state.borrow().options.clone()
    }

    /// Replace the options
    ///
    /// The current selection is kept as is, even if its value is no longer
    /// among the new options.
    pub fn set_options(&self, options: Vec<SelectOption>) {
        let mut state = self.inner.state.borrow_mut();
        tracing::debug!(count = options.len(), "select options replaced");
        state.options = options;
        state.needs_render = true;
    }

    /// The selected option, or the empty option
    pub fn selected_option(&self) -> SelectOption {
        self.inner.state.borrow().selected.clone()
    }

    /// Whether `option` is the selected one (compared by value)
    pub fn is_selected(&self, option: &SelectOption) -> bool {
        self.inner.state.borrow().selected.value == option.value
    }

    /// Stream of every value the select resolves, user or programmatic
    pub fn selected_value(&self) -> Emitter<String> {
        self.inner.selected_value.clone()
    }

    /// Open or close the list; ignored while disabled
    pub fn toggle(&self) -> bool {
        let toggled = self.send(select_events::TOGGLE);
        if !toggled {
            tracing::debug!("select toggle ignored while disabled");
        }
        toggled
    }

    /// Close the list, as an outside click does
    pub fn dismiss(&self) -> bool {
        self.send(select_events::DISMISS)
    }

    /// User selection by value
    ///
    /// The list stays open.
    pub fn choose_value(&self, value: &str) {
        self.set_selected(value, true);
    }

    /// Programmatic selection; does not touch the control or its visibility
    pub fn write_value(&self, value: &str) {
        self.set_selected(value, false);
    }

    pub fn set_disabled_state(&self, disabled: bool) {
        let event = if disabled {
            select_events::DISABLE
        } else {
            select_events::ENABLE
        };
        self.send(event);
    }

    fn send(&self, event: u32) -> bool {
        let mut state = self.inner.state.borrow_mut();
        match state.fsm.send(event) {
            Some(transition) => {
                tracing::debug!(
                    from = transition.from,
                    to = transition.to,
                    event,
                    "select state changed"
                );
                state.needs_render = true;
                true
            }
            None => false,
        }
    }

    fn set_selected(&self, value: &str, from_user: bool) {
        let first_touch = {
            let mut state = self.inner.state.borrow_mut();
            state.selected = resolve_option(&state.options, value);
            state.needs_render = true;
            let first_touch = from_user && !state.touched;
            state.touched |= from_user;
            if state.selected.is_empty() && !value.is_empty() {
                tracing::debug!(value = %value, "no option matches, selection cleared");
            }
            first_touch
        };

        tracing::debug!(value = %value, from_user, "select value resolved");

        // Callbacks may re-enter the select, so no borrow is held here
        self.inner.on_change.call(value.to_string());
        if first_touch {
            self.inner.on_touched.call(());
        }
        self.inner.selected_value.emit(&value.to_string());
    }

    /// Presentation snapshot of the current state
    pub fn view(&self) -> SelectView {
        let selected = self.selected_option();
        let showing_placeholder = selected.is_empty();
        let trigger_text = if showing_placeholder {
            self.inner.config.placeholder.clone()
        } else {
            selected.label
        };

        SelectView {
            trigger_text,
            showing_placeholder,
            open: self.is_open(),
            disabled: self.is_disabled(),
            rows: self
                .options()
                .into_iter()
                .map(|option| OptionRow {
                    selected: self.is_selected(&option),
                    label: option.label,
                    value: option.value,
                })
                .collect(),
        }
    }

    // =========================================================================
    // Element tree
    // =========================================================================

    pub fn is_mounted(&self) -> bool {
        self.inner.mounted.borrow().is_some()
    }

    /// Root element while mounted
    pub fn root(&self) -> Option<ElementId> {
        self.inner.mounted.borrow().as_ref().map(|m| m.root)
    }

    /// Trigger element while mounted
    pub fn trigger(&self) -> Option<ElementId> {
        self.inner.mounted.borrow().as_ref().map(|m| m.trigger)
    }

    /// Option row element for a value while mounted
    pub fn option_element(&self, value: &str) -> Option<ElementId> {
        self.inner.mounted.borrow().as_ref().and_then(|m| {
            m.rows
                .iter()
                .find(|(option, _)| option.value == value)
                .map(|(_, id)| *id)
        })
    }

    /// Build the select's elements under `parent`
    ///
    /// Registers the document click listener that closes the list on outside
    /// clicks, and on the first mount selects the first option (if any)
    /// through [`Select::write_value`]. Mounting again first unmounts.
    pub fn mount(
        &self,
        tree: &mut ElementTree,
        parent: ElementId,
        dispatcher: &EventDispatcher,
    ) -> Result<ElementId, TreeError> {
        if self.is_mounted() {
            self.unmount(tree)?;
        }

        let config = &self.inner.config;
        let root = tree.create_child(parent, "select", Self::root_style(config.width))?;
        let trigger = tree.create_child(root, "select-trigger", Self::row_style(config.size))?;
        let panel = tree.create_child(root, "select-panel", Self::panel_style())?;

        let weak = Rc::downgrade(&self.inner);
        tree.on(trigger, event_types::CLICK, move |_| {
            if let Some(select) = upgrade(&weak) {
                select.toggle();
            }
        })?;

        let rows = self.build_rows(tree, panel)?;

        if let Some(key) = &config.key {
            tree.set_key(root, key.clone())?;
            tree.set_key(trigger, format!("{key}/trigger"))?;
            tree.set_key(panel, format!("{key}/panel"))?;
        }

        let weak = Rc::downgrade(&self.inner);
        let listener = dispatcher.listen(event_types::CLICK, move |event| {
            let Some(select) = upgrade(&weak) else {
                return;
            };
            let Some(root) = select.root() else {
                return;
            };
            if !event.is_within(root) && select.dismiss() {
                tracing::debug!(target_element = ?event.target, "select closed by outside click");
            }
        });

        *self.inner.mounted.borrow_mut() = Some(Mounted {
            root,
            trigger,
            panel,
            rows,
            listener,
        });
        tracing::debug!(?root, "select mounted");

        self.auto_select();
        self.sync_view(tree)?;
        Ok(root)
    }

    /// Remove the select's elements and release its document listener
    pub fn unmount(&self, tree: &mut ElementTree) -> Result<(), TreeError> {
        let Some(mounted) = self.inner.mounted.borrow_mut().take() else {
            return Ok(());
        };
        let root = mounted.root;
        mounted.listener.release();

        if tree.contains_element(root) {
            tree.remove_subtree(root)?;
        }
        tracing::debug!(?root, "select unmounted");
        Ok(())
    }

    /// Mirror the current state into the mounted elements
    ///
    /// Option rows are rebuilt when the options changed. Clears
    /// [`Select::needs_render`]. Does nothing while unmounted.
    pub fn sync_view(&self, tree: &mut ElementTree) -> Result<(), TreeError> {
        let view = self.view();
        let mut mounted = self.inner.mounted.borrow_mut();
        let Some(mounted) = mounted.as_mut() else {
            return Ok(());
        };

        let options = self.options();
        let rows_current = mounted.rows.len() == options.len()
            && mounted
                .rows
                .iter()
                .zip(&options)
                .all(|((rendered, _), option)| rendered == option);
        if !rows_current {
            for (_, row) in mounted.rows.drain(..) {
                if tree.contains_element(row) {
                    tree.remove_subtree(row)?;
                }
            }
            mounted.rows = self.build_rows(tree, mounted.panel)?;
        }

        tree.set_text(mounted.trigger, view.trigger_text.clone())?;
        tree.set_class(mounted.trigger, "placeholder", view.showing_placeholder)?;
        tree.set_class(mounted.root, "open", view.open)?;
        tree.set_class(mounted.root, "disabled", view.disabled)?;
        tree.set_visible(mounted.panel, view.open)?;
        for ((_, row), row_view) in mounted.rows.iter().zip(&view.rows) {
            tree.set_class(*row, "selected", row_view.selected)?;
        }

        self.inner.state.borrow_mut().needs_render = false;
        Ok(())
    }

    fn build_rows(
        &self,
        tree: &mut ElementTree,
        panel: ElementId,
    ) -> Result<Vec<(SelectOption, ElementId)>, TreeError> {
        let options = self.options();
        let mut rows = Vec::with_capacity(options.len());

        for option in options {
            let row = tree.create_child(panel, "select-option", Self::row_style(self.inner.config.size))?;
            tree.set_text(row, option.label.clone())?;
            if let Some(key) = &self.inner.config.key {
                tree.set_key(row, format!("{key}/option/{}", option.value))?;
            }

            let weak = Rc::downgrade(&self.inner);
            let value = option.value.clone();
            tree.on(row, event_types::CLICK, move |_| {
                if let Some(select) = upgrade(&weak) {
                    select.choose_value(&value);
                }
            })?;

            rows.push((option, row));
        }
        Ok(rows)
    }

    fn auto_select(&self) {
        let first = {
            let mut state = self.inner.state.borrow_mut();
            if state.auto_selected {
                return;
            }
            state.auto_selected = true;
            state.options.first().map(|option| option.value.clone())
        };
        if let Some(value) = first {
            self.write_value(&value);
        }
    }

    fn root_style(width: f32) -> Style {
        Style {
            display: Display::Flex,
            flex_direction: FlexDirection::Column,
            size: Size {
                width: Dimension::Length(width),
                height: Dimension::Auto,
            },
            flex_shrink: 0.0,
            ..Default::default()
        }
    }

    fn row_style(size: SelectSize) -> Style {
        Style {
            size: Size {
                width: Dimension::Percent(1.0),
                height: Dimension::Length(size.height()),
            },
            flex_shrink: 0.0,
            ..Default::default()
        }
    }

    fn panel_style() -> Style {
        Style {
            display: Display::None,
            flex_direction: FlexDirection::Column,
            size: Size {
                width: Dimension::Percent(1.0),
                height: Dimension::Auto,
            },
            flex_shrink: 0.0,
            ..Default::default()
        }
    }
}

impl Default for Select {
    fn default() -> Self {
        Self::new(SelectConfig::default())
    }
}

impl fmt::Debug for Select {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("Select")
            .field("options", &state.options.len())
            .field("selected", &state.selected)
            .field("state", &state.fsm.current())
            .field("touched", &state.touched)
            .field("mounted", &self.inner.mounted.borrow().is_some())
            .finish()
    }
}

impl ValueAccessor for Select {
    fn write_value(&self, value: &str) {
        Select::write_value(self, value);
    }

    fn register_on_change(&self, callback: Callback<String>) {
        self.inner.on_change.replace(callback);
    }

    fn register_on_touched(&self, callback: Callback<()>) {
        self.inner.on_touched.replace(callback);
    }

    fn set_disabled_state(&self, disabled: bool) {
        Select::set_disabled_state(self, disabled);
    }
}

/// Create a select builder
pub fn select() -> SelectBuilder {
    SelectBuilder::default()
}

/// Builder for [`Select`]
#[derive(Default)]
pub struct SelectBuilder {
    config: SelectConfig,
    options: Vec<SelectOption>,
    disabled: bool,
}

impl SelectBuilder {
    /// Add an option
    pub fn option(mut self, value: impl Into<String>, label: impl Into<String>) -> Self {
        self.options.push(SelectOption::new(value, label));
        self
    }

    /// Add several options
    pub fn options(mut self, options: impl IntoIterator<Item = SelectOption>) -> Self {
        self.options.extend(options);
        self
    }

    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        self.config.placeholder = text.into();
        self
    }

    pub fn size(mut self, size: SelectSize) -> Self {
        self.config.size = size;
        self
    }

    /// Set the width
    pub fn w(mut self, width: f32) -> Self {
        self.config.width = width;
        self
    }

    /// Set the element key prefix
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.config.key = Some(key.into());
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn build(self) -> Select {
        let select = Select::with_options(self.config, self.options);
        if self.disabled {
            select.set_disabled_state(true);
        }
        select
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dropline_core::{EventRouter, Subscription};
    use std::cell::Cell;

    /// Records everything the select reports outward
    struct Recorder {
        changes: Rc<RefCell<Vec<String>>>,
        touches: Rc<Cell<u32>>,
        emitted: Rc<RefCell<Vec<String>>>,
        _sub: Subscription,
    }

    impl Recorder {
        fn attach(select: &Select) -> Self {
            let changes = Rc::new(RefCell::new(Vec::new()));
            let touches = Rc::new(Cell::new(0));
            let emitted = Rc::new(RefCell::new(Vec::new()));

            let changes_clone = Rc::clone(&changes);
            select.register_on_change(Callback::new(move |v: String| {
                changes_clone.borrow_mut().push(v)
            }));
            let touches_clone = Rc::clone(&touches);
            select.register_on_touched(Callback::new(move |()| {
                touches_clone.set(touches_clone.get() + 1)
            }));
            let emitted_clone = Rc::clone(&emitted);
            let sub = select
                .selected_value()
                .subscribe(move |v: &String| emitted_clone.borrow_mut().push(v.clone()));

            Self {
                changes,
                touches,
                emitted,
                _sub: sub,
            }
        }
    }

    fn fruits() -> Select {
        select()
            .option("a", "A")
            .option("b", "B")
            .option("c", "C")
            .build()
    }

    struct Page {
        tree: ElementTree,
        router: EventRouter,
    }

    impl Page {
        fn new() -> Self {
            Self {
                tree: ElementTree::new(800.0, 600.0).unwrap(),
                router: EventRouter::new(EventDispatcher::new()),
            }
        }

        fn mount(&mut self, select: &Select) -> ElementId {
            let root = self.tree.root();
            let id = select
                .mount(&mut self.tree, root, self.router.dispatcher())
                .unwrap();
            self.tree.compute_layout().unwrap();
            id
        }

        fn click(&mut self, element: ElementId, select: &Select) {
            self.router.click_element(&self.tree, element);
            select.sync_view(&mut self.tree).unwrap();
            self.tree.compute_layout().unwrap();
        }

        fn click_outside(&mut self, select: &Select) {
            self.router.click_outside(&self.tree);
            select.sync_view(&mut self.tree).unwrap();
        }

        fn listeners(&self) -> usize {
            self.router.dispatcher().listener_count()
        }
    }

    #[test]
    fn test_resolve_option_first_match_or_empty() {
        let options = vec![
            SelectOption::new("x", "First"),
            SelectOption::new("x", "Second"),
        ];
        assert_eq!(resolve_option(&options, "x").label, "First");
        assert_eq!(resolve_option(&options, "missing"), SelectOption::empty());
        assert_eq!(resolve_option(&[], "x"), SelectOption::empty());
    }

    #[test]
    fn test_resolve_option_table() {
        let none: Vec<SelectOption> = Vec::new();
        let single = vec![SelectOption::new("a", "A")];
        let dup_at_end = vec![
            SelectOption::new("a", "A"),
            SelectOption::new("b", "B1"),
            SelectOption::new("b", "B2"),
        ];
        let blank_value = vec![
            SelectOption::new("a", "A"),
            SelectOption::new("", "Nothing"),
        ];

        let cases: &[(&[SelectOption], &str, Option<&str>)] = &[
            (&none[..], "", None),
            (&none[..], "a", None),
            (&single[..], "a", Some("A")),
            (&single[..], "A", None),
            (&single[..], "", None),
            (&dup_at_end[..], "b", Some("B1")),
            (&dup_at_end[..], "a", Some("A")),
            (&dup_at_end[..], "c", None),
            (&blank_value[..], "", Some("Nothing")),
            (&blank_value[..], "a", Some("A")),
        ];

        for (options, value, label) in cases {
            let resolved = resolve_option(options, value);
            match label {
                Some(label) => {
                    assert_eq!(resolved.label, *label, "value {value:?}");
                    assert_eq!(resolved.value, *value);
                }
                None => assert_eq!(resolved, SelectOption::empty(), "value {value:?}"),
            }
        }

        // First match wins for any position of the duplicate
        for options in [&single, &dup_at_end, &blank_value] {
            for option in options.iter() {
                let first = options.iter().find(|o| o.value == option.value).cloned();
                assert_eq!(Some(resolve_option(options, &option.value)), first);
            }
        }
    }

    #[test]
    fn test_option_deserializes_from_json() {
        let options: Vec<SelectOption> =
            serde_json::from_str(r#"[{"label": "Apple", "value": "apple"}]"#).unwrap();
        assert_eq!(options, vec![SelectOption::new("apple", "Apple")]);
    }

    #[test]
    fn test_initial_state() {
        let select = fruits();
        assert_eq!(select.state(), states::CLOSED);
        assert!(select.selected_option().is_empty());
        assert!(!select.is_touched());
        assert!(!select.is_mounted());
    }

    #[test]
    fn test_mount_auto_selects_first_option() {
        let select = fruits();
        let recorder = Recorder::attach(&select);
        let mut page = Page::new();
        page.mount(&select);

        assert_eq!(select.selected_option(), SelectOption::new("a", "A"));
        assert_eq!(*recorder.changes.borrow(), vec!["a".to_string()]);
        assert_eq!(*recorder.emitted.borrow(), vec!["a".to_string()]);
        assert_eq!(recorder.touches.get(), 0);
        assert!(!select.is_touched());
        assert_eq!(page.listeners(), 1);
    }

    #[test]
    fn test_mount_with_no_options_keeps_empty_selection() {
        let select = Select::default();
        let recorder = Recorder::attach(&select);
        let mut page = Page::new();
        page.mount(&select);

        assert!(select.selected_option().is_empty());
        assert!(recorder.changes.borrow().is_empty());
        assert_eq!(select.view().trigger_text, "Select an option");

        page.click(select.trigger().unwrap(), &select);
        assert!(select.is_open());
        assert!(select.view().rows.is_empty());
    }

    #[test]
    fn test_auto_select_runs_once_per_instance() {
        let select = fruits();
        let mut page = Page::new();
        page.mount(&select);
        select.choose_value("c");

        select.unmount(&mut page.tree).unwrap();
        page.mount(&select);
        assert_eq!(select.selected_option().value, "c");
    }

    #[test]
    fn test_trigger_click_toggles() {
        let select = fruits();
        let mut page = Page::new();
        page.mount(&select);
        let trigger = select.trigger().unwrap();

        page.click(trigger, &select);
        assert!(select.is_open());
        assert!(page.tree.is_visible(select.option_element("b").unwrap()));

        page.click(trigger, &select);
        assert!(!select.is_open());
        assert!(!page.tree.is_visible(select.option_element("b").unwrap()));
    }

    #[test]
    fn test_toggle_is_ignored_while_disabled() {
        let select = fruits();
        let mut page = Page::new();
        page.mount(&select);
        select.set_disabled_state(true);

        for _ in 0..3 {
            page.click(select.trigger().unwrap(), &select);
            assert_eq!(select.state(), states::CLOSED_DISABLED);
        }
        assert!(!select.toggle());
        assert!(page.tree.has_class(select.root().unwrap(), "disabled"));
    }

    #[test]
    fn test_disabling_leaves_open_list_open() {
        let select = fruits();
        select.toggle();
        select.set_disabled_state(true);
        assert_eq!(select.state(), states::OPEN_DISABLED);

        select.set_disabled_state(false);
        assert_eq!(select.state(), states::OPEN);
    }

    #[test]
    fn test_outside_click_closes() {
        let select = fruits();
        let mut page = Page::new();
        page.mount(&select);

        page.click(select.trigger().unwrap(), &select);
        page.click_outside(&select);
        assert!(!select.is_open());

        // Closed stays closed
        page.click_outside(&select);
        assert_eq!(select.state(), states::CLOSED);

        // Disabled and open also closes
        select.toggle();
        select.set_disabled_state(true);
        page.click_outside(&select);
        assert_eq!(select.state(), states::CLOSED_DISABLED);
    }

    #[test]
    fn test_click_on_sibling_element_is_outside() {
        let select = fruits();
        let mut page = Page::new();
        let root = page.tree.root();
        let sibling = page
            .tree
            .create_child(
                root,
                "button",
                Style {
                    size: Size {
                        width: Dimension::Length(100.0),
                        height: Dimension::Length(30.0),
                    },
                    flex_shrink: 0.0,
                    ..Default::default()
                },
            )
            .unwrap();
        page.mount(&select);

        page.click(select.trigger().unwrap(), &select);
        page.click(sibling, &select);
        assert!(!select.is_open());
    }

    #[test]
    fn test_inside_click_leaves_state_unchanged() {
        let select = fruits();
        let mut page = Page::new();
        let root = page.mount(&select);

        page.click(select.trigger().unwrap(), &select);
        let before = (select.state(), select.selected_option());

        page.click(root, &select);
        assert_eq!((select.state(), select.selected_option()), before);
    }

    #[test]
    fn test_write_value_selects_and_notifies() {
        let select = fruits();
        let recorder = Recorder::attach(&select);

        select.write_value("b");

        assert_eq!(select.selected_option(), SelectOption::new("b", "B"));
        assert_eq!(*recorder.changes.borrow(), vec!["b".to_string()]);
        assert_eq!(*recorder.emitted.borrow(), vec!["b".to_string()]);
        assert_eq!(recorder.touches.get(), 0);
        assert!(!select.is_open());
        assert!(select.needs_render());
    }

    #[test]
    fn test_unknown_value_clears_selection_but_reports_raw_value() {
        let select = fruits();
        let recorder = Recorder::attach(&select);
        select.write_value("b");
        select.write_value("zzz");

        assert!(select.selected_option().is_empty());
        assert_eq!(recorder.changes.borrow().last().map(String::as_str), Some("zzz"));
        assert!(select.view().showing_placeholder);
    }

    #[test]
    fn test_single_option_click_touches_once() {
        let select = select().option("x", "X").build();
        let recorder = Recorder::attach(&select);
        let mut page = Page::new();
        page.mount(&select);

        page.click(select.trigger().unwrap(), &select);
        let row = select.option_element("x").unwrap();
        page.click(row, &select);
        page.click(row, &select);

        assert_eq!(select.selected_option().value, "x");
        // Mount auto-select, then one change per click
        assert_eq!(*recorder.changes.borrow(), vec!["x".to_string(); 3]);
        assert_eq!(*recorder.emitted.borrow(), vec!["x".to_string(); 3]);
        assert_eq!(recorder.touches.get(), 1);
        assert!(select.is_touched());
        assert!(page.tree.has_class(row, "selected"));
    }

    #[test]
    fn test_selection_leaves_list_open() {
        let select = fruits();
        let mut page = Page::new();
        page.mount(&select);

        page.click(select.trigger().unwrap(), &select);
        page.click(select.option_element("c").unwrap(), &select);

        assert_eq!(select.selected_option().value, "c");
        assert!(select.is_open());
    }

    #[test]
    fn test_replacing_options_keeps_stale_selection() {
        let select = fruits();
        let mut page = Page::new();
        page.mount(&select);
        select.choose_value("b");

        select.set_options(vec![SelectOption::new("z", "Z")]);
        select.sync_view(&mut page.tree).unwrap();

        assert_eq!(select.selected_option(), SelectOption::new("b", "B"));
        assert!(select.option_element("b").is_none());
        assert!(select.option_element("z").is_some());
        assert_eq!(select.view().trigger_text, "B");
    }

    #[test]
    fn test_listener_released_on_unmount() {
        let select = fruits();
        let mut page = Page::new();
        let nodes_before = page.tree.len();

        for _ in 0..20 {
            page.mount(&select);
            assert_eq!(page.listeners(), 1);
            select.unmount(&mut page.tree).unwrap();
            assert_eq!(page.listeners(), 0);
        }
        assert_eq!(page.tree.len(), nodes_before);
        assert!(select.root().is_none());
    }

    #[test]
    fn test_remount_replaces_previous_mount() {
        let select = fruits();
        let mut page = Page::new();
        let first = page.mount(&select);
        let second = page.mount(&select);

        assert_ne!(first, second);
        assert!(!page.tree.contains_element(first));
        assert_eq!(page.listeners(), 1);
    }

    #[test]
    fn test_listener_released_on_drop() {
        let mut page = Page::new();
        {
            let select = fruits();
            page.mount(&select);
            assert_eq!(page.listeners(), 1);
        }
        assert_eq!(page.listeners(), 0);

        // Element handlers of the dropped select are inert
        page.router.click_at(&page.tree, 10.0, 10.0);
    }

    #[test]
    fn test_sync_view_mirrors_state() {
        let select = fruits();
        let mut page = Page::new();
        page.mount(&select);
        assert!(!select.needs_render());

        let trigger = select.trigger().unwrap();
        assert_eq!(page.tree.text(trigger), Some("A"));

        select.toggle();
        select.write_value("b");
        assert!(select.needs_render());
        select.sync_view(&mut page.tree).unwrap();

        assert_eq!(page.tree.text(trigger), Some("B"));
        assert!(page.tree.has_class(select.root().unwrap(), "open"));
        assert!(page.tree.has_class(select.option_element("b").unwrap(), "selected"));
        assert!(!page.tree.has_class(select.option_element("a").unwrap(), "selected"));
        assert!(!select.needs_render());
    }

    #[test]
    fn test_keys_register_elements() {
        let select = select().key("fruit").option("a", "A").build();
        let mut page = Page::new();
        let root = page.mount(&select);

        assert_eq!(page.tree.find("fruit"), Some(root));
        assert_eq!(page.tree.find("fruit/trigger"), select.trigger());
        assert_eq!(page.tree.find("fruit/option/a"), select.option_element("a"));
    }

    #[test]
    fn test_view_display() {
        let select = fruits();
        select.write_value("b");
        assert_eq!(select.view().to_string(), "[B]");

        select.toggle();
        assert_eq!(
            select.view().to_string(),
            "[B] open\n  ( ) A <a>\n  (*) B <b>\n  ( ) C <c>"
        );
    }

    #[test]
    fn test_is_selected_compares_values() {
        let select = fruits();
        select.write_value("a");
        assert!(select.is_selected(&SelectOption::new("a", "Other label")));
        assert!(!select.is_selected(&SelectOption::new("b", "B")));
    }

    #[test]
    fn test_size_heights() {
        assert_eq!(SelectSize::Small.height(), 32.0);
        assert_eq!(SelectSize::default().height(), 40.0);
        assert_eq!(SelectSize::Large.height(), 48.0);
    }
}
