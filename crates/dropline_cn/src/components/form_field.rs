//! Form field hosting a select
//!
//! A single-control form group bound to a [`Select`]. The field republishes
//! both the group's value changes and the select's own output on
//! [`FormField::selected`], a stream that always holds the latest value. A
//! single selection therefore publishes twice, once per source.
//!
//! ```rust
//! use dropline_cn::prelude::*;
//! use dropline_core::{ElementTree, EventDispatcher};
//!
//! let fruit = cn::select().option("apple", "Apple").build();
//! let field = cn::form_field(fruit).build();
//!
//! let mut tree = ElementTree::new(800.0, 600.0).unwrap();
//! let root = tree.root();
//! field.mount(&mut tree, root, &EventDispatcher::new()).unwrap();
//!
//! assert_eq!(field.selected().get(), "apple");
//! assert_eq!(field.group().value()[DEFAULT_FIELD], "apple");
//! ```

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use dropline_core::events::EventDispatcher;
use dropline_core::tree::{ElementId, ElementTree};
use dropline_core::{Subscription, TreeError, ValueStream};
use dropline_forms::{FormControl, FormGroup, GroupValue};

use super::select::{Select, SelectView};

/// Name of the field's control unless configured otherwise
pub const DEFAULT_FIELD: &str = "customDropdown";

/// A form with one select-backed control
pub struct FormField {
    field: String,
    group: FormGroup,
    control: FormControl,
    select: Select,
    selected: ValueStream<String>,
    needs_render: Rc<Cell<bool>>,
    _group_changes: Subscription,
    _select_output: Subscription,
}

impl FormField {
    fn new(select: Select, field: String, disabled: bool) -> Self {
        let control = FormControl::with_state("", disabled);
        let group = FormGroup::builder()
            .control(field.clone(), control.clone())
            .build();
        let selected = ValueStream::new(String::new());
        let needs_render = Rc::new(Cell::new(true));

        let stream = selected.clone();
        let dirty = Rc::clone(&needs_render);
        let name = field.clone();
        let group_changes = group.value_changes().subscribe(move |value: &GroupValue| {
            let current = value.get(&name).cloned().unwrap_or_default();
            tracing::debug!(field = %name, value = %current, "form field value changed");
            stream.next(current);
            dirty.set(true);
        });

        control.bind(Rc::new(select.clone()));

        let stream = selected.clone();
        let dirty = Rc::clone(&needs_render);
        let select_output = select.selected_value().subscribe(move |value: &String| {
            stream.next(value.clone());
            dirty.set(true);
        });

        Self {
            field,
            group,
            control,
            select,
            selected,
            needs_render,
            _group_changes: group_changes,
            _select_output: select_output,
        }
    }

    /// Name of the field's control
    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn group(&self) -> &FormGroup {
        &self.group
    }

    pub fn control(&self) -> &FormControl {
        &self.control
    }

    pub fn select(&self) -> &Select {
        &self.select
    }

    /// Latest value of the field
    pub fn selected(&self) -> ValueStream<String> {
        self.selected.clone()
    }

    /// Publish a value on [`FormField::selected`] without going through the form
    pub fn selected_value(&self, value: impl Into<String>) {
        self.selected.next(value.into());
        self.needs_render.set(true);
    }

    pub fn disable(&self) {
        self.control.disable();
    }

    pub fn enable(&self) {
        self.control.enable();
    }

    /// Whether the field or its select changed since the last sync
    pub fn needs_render(&self) -> bool {
        self.needs_render.get() || self.select.needs_render()
    }

    pub fn view(&self) -> SelectView {
        self.select.view()
    }

    /// Mount the select under `parent`
    pub fn mount(
        &self,
        tree: &mut ElementTree,
        parent: ElementId,
        dispatcher: &EventDispatcher,
    ) -> Result<ElementId, TreeError> {
        let root = self.select.mount(tree, parent, dispatcher)?;
        self.needs_render.set(false);
        Ok(root)
    }

    pub fn unmount(&self, tree: &mut ElementTree) -> Result<(), TreeError> {
        self.select.unmount(tree)
    }

    pub fn sync_view(&self, tree: &mut ElementTree) -> Result<(), TreeError> {
        self.select.sync_view(tree)?;
        self.needs_render.set(false);
        Ok(())
    }
}

impl fmt::Debug for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormField")
            .field("field", &self.field)
            .field("control", &self.control)
            .field("selected", &self.selected)
            .field("select", &self.select)
            .finish()
    }
}

/// Create a form field builder around a select
pub fn form_field(select: Select) -> FormFieldBuilder {
    FormFieldBuilder {
        select,
        field: DEFAULT_FIELD.to_string(),
        disabled: false,
    }
}

/// Builder for [`FormField`]
pub struct FormFieldBuilder {
    select: Select,
    field: String,
    disabled: bool,
}

impl FormFieldBuilder {
    /// Name the field's control
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.field = name.into();
        self
    }

    /// Start with the control disabled
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn build(self) -> FormField {
        FormField::new(self.select, self.field, self.disabled)
    }
}
