//! # Dropline Components (dropline_cn)
//!
//! Headless components built on `dropline_core` primitives and bound to forms
//! through `dropline_forms`.
//!
//! ## Example
//!
//! ```rust
//! use dropline_cn::prelude::*;
//!
//! let fruit = cn::select()
//!     .placeholder("Choose a fruit...")
//!     .option("apple", "Apple")
//!     .option("banana", "Banana")
//!     .size(SelectSize::Large)
//!     .build();
//!
//! fruit.toggle();
//! assert!(fruit.is_open());
//! ```
//!
//! ## Components
//!
//! - **Select** - dropdown value selection with outside-click dismissal
//! - **FormField** - a single-field form hosting a select

pub mod components;

pub use components::*;

/// Convenience module for accessing components with `cn::` prefix
pub mod cn {
    pub use crate::components::form_field::form_field;
    pub use crate::components::select::select;
}

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::cn;
    pub use crate::components::form_field::{FormField, FormFieldBuilder, DEFAULT_FIELD};
    pub use crate::components::select::{
        Select, SelectBuilder, SelectConfig, SelectOption, SelectSize, SelectView,
    };
    pub use dropline_forms::ValueAccessor;
}
