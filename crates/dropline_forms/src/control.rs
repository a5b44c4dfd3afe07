//! Form-side state of a single field

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use dropline_core::{Callback, Emitter};

use crate::accessor::ValueAccessor;

#[derive(Clone, Debug, Default)]
struct ControlState {
    value: String,
    disabled: bool,
    touched: bool,
    /// Changed by the user (as opposed to the model)
    dirty: bool,
}

struct ControlInner {
    state: RefCell<ControlState>,
    value_changes: Emitter<String>,
    accessor: RefCell<Option<Rc<dyn ValueAccessor>>>,
    /// Set while the model is being written into the bound control
    writing: Cell<bool>,
}

/// The form-side state of one field
///
/// Cheap to clone; clones share the same state.
///
/// Model writes ([`FormControl::set_value`]) are pushed into the bound
/// control. Changes reported by the bound control update the model and mark
/// it dirty, but are not written back. Every reported change is emitted, even
/// when it repeats the current value. Changes reported while the model is being
/// written into the control are ignored, so a control echoing a written value
/// through its change callback does not loop.
#[derive(Clone)]
pub struct FormControl {
    inner: Rc<ControlInner>,
}

impl FormControl {
    /// Create an enabled control with an initial value
    pub fn new(value: impl Into<String>) -> Self {
        Self::with_state(value, false)
    }

    /// Create a control with an initial value and disabled flag
    pub fn with_state(value: impl Into<String>, disabled: bool) -> Self {
        Self {
            inner: Rc::new(ControlInner {
                state: RefCell::new(ControlState {
                    value: value.into(),
                    disabled,
                    ..Default::default()
                }),
                value_changes: Emitter::new(),
                accessor: RefCell::new(None),
                writing: Cell::new(false),
            }),
        }
    }

    pub fn value(&self) -> String {
        self.inner.state.borrow().value.clone()
    }

    pub fn is_disabled(&self) -> bool {
        self.inner.state.borrow().disabled
    }

    pub fn is_touched(&self) -> bool {
        self.inner.state.borrow().touched
    }

    pub fn is_dirty(&self) -> bool {
        self.inner.state.borrow().dirty
    }

    /// Whether a control is bound
    pub fn is_bound(&self) -> bool {
        self.inner.accessor.borrow().is_some()
    }

    /// Stream of value changes, from either direction
    pub fn value_changes(&self) -> Emitter<String> {
        self.inner.value_changes.clone()
    }

    /// Set the value from the model side
    ///
    /// The bound control receives the value through `write_value`, then
    /// `value_changes` subscribers are notified.
    pub fn set_value(&self, value: impl Into<String>) {
        let value = value.into();
        self.inner.state.borrow_mut().value = value.clone();

        if let Some(accessor) = self.accessor() {
            self.write_to_view(&*accessor, &value);
        }
        self.inner.value_changes.emit(&value);
    }

    /// Bind a control to this field
    ///
    /// Registers the change and touch callbacks, then pushes the current value
    /// and disabled state into the control. Replaces any previous binding.
    pub fn bind(&self, accessor: Rc<dyn ValueAccessor>) {
        let weak = Rc::downgrade(&self.inner);
        accessor.register_on_change(Callback::new(move |value: String| {
            if let Some(control) = upgrade(&weak) {
                control.update_from_view(value);
            }
        }));

        let weak = Rc::downgrade(&self.inner);
        accessor.register_on_touched(Callback::new(move |()| {
            if let Some(control) = upgrade(&weak) {
                control.mark_as_touched();
            }
        }));

        *self.inner.accessor.borrow_mut() = Some(Rc::clone(&accessor));

        let (value, disabled) = {
            let state = self.inner.state.borrow();
            (state.value.clone(), state.disabled)
        };
        tracing::debug!(value = %value, disabled, "binding form control");
        self.write_to_view(&*accessor, &value);
        accessor.set_disabled_state(disabled);
    }

    fn write_to_view(&self, accessor: &dyn ValueAccessor, value: &str) {
        let was_writing = self.inner.writing.replace(true);
        accessor.write_value(value);
        self.inner.writing.set(was_writing);
    }

    pub fn disable(&self) {
        self.set_disabled(true);
    }

    pub fn enable(&self) {
        self.set_disabled(false);
    }

    fn set_disabled(&self, disabled: bool) {
        {
            let mut state = self.inner.state.borrow_mut();
            if state.disabled == disabled {
                return;
            }
            state.disabled = disabled;
        }
        if let Some(accessor) = self.accessor() {
            accessor.set_disabled_state(disabled);
        }
    }

    pub fn mark_as_touched(&self) {
        self.inner.state.borrow_mut().touched = true;
    }

    /// Apply a value reported by the bound control
    fn update_from_view(&self, value: String) {
        if self.inner.writing.get() {
            return;
        }
        {
            let mut state = self.inner.state.borrow_mut();
            state.value = value.clone();
            state.dirty = true;
        }
        tracing::debug!(value = %value, "form control updated from view");
        self.inner.value_changes.emit(&value);
    }

    fn accessor(&self) -> Option<Rc<dyn ValueAccessor>> {
        self.inner.accessor.borrow().clone()
    }
}

fn upgrade(weak: &Weak<ControlInner>) -> Option<FormControl> {
    weak.upgrade().map(|inner| FormControl { inner })
}

impl Default for FormControl {
    fn default() -> Self {
        Self::new("")
    }
}

impl fmt::Debug for FormControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("FormControl")
            .field("value", &state.value)
            .field("disabled", &state.disabled)
            .field("touched", &state.touched)
            .field("dirty", &state.dirty)
            .field("bound", &self.inner.accessor.borrow().is_some())
            .finish()
    }
}
