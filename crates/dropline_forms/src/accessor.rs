//! The value accessor protocol
//!
//! A control that wants to take part in a form implements [`ValueAccessor`].
//! The form side ([`crate::FormControl`]) drives it:
//!
//! ```text
//! FormControl                      control
//!     │ write_value(v)  ──────────────▶ │
//!     │ set_disabled_state(b) ────────▶ │
//!     │ ◀────────────── on_change(v)    │  user picked a value
//!     │ ◀────────────── on_touched()    │  user interacted
//! ```
//!
//! Every method takes `&self`. Callbacks registered here are invoked while the
//! form is mid-update, so implementors keep their state behind interior
//! mutability and must not hold a borrow across a callback.

use dropline_core::Callback;

/// A control that can be bound to a [`crate::FormControl`]
pub trait ValueAccessor {
    /// Write a value from the model into the control
    ///
    /// Must not mark the control as touched.
    fn write_value(&self, value: &str);

    /// Register the callback the control invokes when the user changes the value
    fn register_on_change(&self, callback: Callback<String>);

    /// Register the callback the control invokes when the user interacts with it
    fn register_on_touched(&self, callback: Callback<()>);

    /// Enable or disable the control
    fn set_disabled_state(&self, disabled: bool);
}
