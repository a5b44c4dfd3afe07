//! # Dropline shell
//!
//! The page around the select: where options come from, how the demo is
//! configured, and a headless home page that interaction scripts drive.

pub mod config;
pub mod error;
pub mod home;
pub mod script;
pub mod source;

pub use config::DroplineConfig;
pub use error::{AppError, Result, SourceError};
pub use home::HomePage;
pub use script::{parse_script, Interaction, Step};
pub use source::{JsonFileSource, OptionSource, StaticSource};
