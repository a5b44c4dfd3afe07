//! Component implementations

pub mod form_field;
pub mod select;

pub use form_field::{form_field, FormField, FormFieldBuilder};
pub use select::{
    resolve_option, select, OptionRow, Select, SelectBuilder, SelectConfig, SelectOption,
    SelectSize, SelectView,
};
