//! # Dropline Forms
//!
//! Binds form state to input controls through a small, synchronous protocol.
//!
//! - [`ValueAccessor`]: implemented by controls. The form writes values and
//!   disabled state into the control, and the control reports user changes
//!   and touches back through registered callbacks.
//! - [`FormControl`]: the form-side state of a single field.
//! - [`FormGroup`]: an ordered collection of named controls.
//!
//! ```rust
//! use dropline_forms::{FormControl, FormGroup};
//!
//! let group = FormGroup::builder()
//!     .control("fruit", FormControl::new("apple"))
//!     .build();
//!
//! group.get("fruit").unwrap().set_value("pear");
//! assert_eq!(group.value()["fruit"], "pear");
//! ```

pub mod accessor;
pub mod control;
pub mod group;

pub use accessor::ValueAccessor;
pub use control::FormControl;
pub use group::{FormGroup, FormGroupBuilder, GroupValue};
