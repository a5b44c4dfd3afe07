//! Ordered groups of named form controls

use std::fmt;
use std::rc::{Rc, Weak};

use dropline_core::{Emitter, Subscription};
use indexmap::IndexMap;

use crate::control::FormControl;

/// A group's value: control name to control value, in declaration order
pub type GroupValue = IndexMap<String, String>;

struct GroupInner {
    controls: IndexMap<String, FormControl>,
    value_changes: Emitter<GroupValue>,
    /// Member subscriptions, released with the group
    _subscriptions: Vec<Subscription>,
}

impl GroupInner {
    fn value(&self) -> GroupValue {
        self.controls
            .iter()
            .map(|(name, control)| (name.clone(), control.value()))
            .collect()
    }
}

/// A named, ordered collection of [`FormControl`]s
///
/// Whenever a member's value changes, the whole group value is re-emitted on
/// [`FormGroup::value_changes`].
#[derive(Clone)]
pub struct FormGroup {
    inner: Rc<GroupInner>,
}

impl FormGroup {
    pub fn builder() -> FormGroupBuilder {
        FormGroupBuilder::default()
    }

    /// Look up a control by name
    pub fn get(&self, name: &str) -> Option<&FormControl> {
        self.inner.controls.get(name)
    }

    pub fn len(&self) -> usize {
        self.inner.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.controls.is_empty()
    }

    /// Current value of every control
    pub fn value(&self) -> GroupValue {
        self.inner.value()
    }

    /// Stream of group values, emitted after any member changes
    pub fn value_changes(&self) -> Emitter<GroupValue> {
        self.inner.value_changes.clone()
    }
}

impl fmt::Debug for FormGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormGroup")
            .field("controls", &self.inner.controls)
            .finish()
    }
}

/// Builder for [`FormGroup`]
#[derive(Default)]
pub struct FormGroupBuilder {
    controls: IndexMap<String, FormControl>,
}

impl FormGroupBuilder {
    /// Add a named control; a repeated name replaces the earlier control
    pub fn control(mut self, name: impl Into<String>, control: FormControl) -> Self {
        self.controls.insert(name.into(), control);
        self
    }

    pub fn build(self) -> FormGroup {
        let inner = Rc::new_cyclic(|weak: &Weak<GroupInner>| {
            let value_changes = Emitter::new();
            let subscriptions = self
                .controls
                .values()
                .map(|control| {
                    let group = weak.clone();
                    control.value_changes().subscribe(move |_: &String| {
                        if let Some(group) = group.upgrade() {
                            group.value_changes.emit(&group.value());
                        }
                    })
                })
                .collect();

            GroupInner {
                controls: self.controls,
                value_changes,
                _subscriptions: subscriptions,
            }
        });
        FormGroup { inner }
    }
}
