//! Option sources
//!
//! The page asks a source for its options once, before building the form.
//! Failures stay with the caller; the select only ever sees a list.

use std::fs;
use std::path::{Path, PathBuf};

use dropline_cn::SelectOption;

use crate::error::SourceError;

/// Location of the bundled options file, relative to the working directory
pub const DEFAULT_OPTIONS_PATH: &str = "assets/data/home-options.json";

/// Something that can provide select options
#[allow(async_fn_in_trait)]
pub trait OptionSource {
    async fn fetch_options(&self) -> Result<Vec<SelectOption>, SourceError>;
}

/// Options read from a JSON file holding an array of `{label, value}` records
#[derive(Clone, Debug)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for JsonFileSource {
    fn default() -> Self {
        Self::new(DEFAULT_OPTIONS_PATH)
    }
}

impl OptionSource for JsonFileSource {
    async fn fetch_options(&self) -> Result<Vec<SelectOption>, SourceError> {
        let content = fs::read_to_string(&self.path).map_err(|source| SourceError::Read {
            path: self.path.clone(),
            source,
        })?;

        let options: Vec<SelectOption> =
            serde_json::from_str(&content).map_err(|source| SourceError::Parse {
                path: self.path.clone(),
                source,
            })?;

        tracing::debug!(path = %self.path.display(), count = options.len(), "options loaded");
        Ok(options)
    }
}

/// Options held in memory
#[derive(Clone, Debug, Default)]
pub struct StaticSource {
    options: Vec<SelectOption>,
}

impl StaticSource {
    pub fn new(options: Vec<SelectOption>) -> Self {
        Self { options }
    }
}

impl OptionSource for StaticSource {
    async fn fetch_options(&self) -> Result<Vec<SelectOption>, SourceError> {
        Ok(self.options.clone())
    }
}
