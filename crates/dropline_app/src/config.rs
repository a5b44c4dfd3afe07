//! Dropline configuration file handling
//!
//! `dropline.toml` configures the demo page. Every section and field is
//! optional; a missing file means all defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use dropline_cn::components::form_field::DEFAULT_FIELD;
use dropline_cn::SelectSize;

use crate::error::{AppError, Result};
use crate::source::DEFAULT_OPTIONS_PATH;

/// Default configuration file name
pub const CONFIG_FILE: &str = "dropline.toml";

/// Contents of `dropline.toml`
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DroplineConfig {
    #[serde(default)]
    pub options: OptionsConfig,
    #[serde(default)]
    pub form: FormConfig,
    #[serde(default)]
    pub select: SelectSection,
    #[serde(default)]
    pub viewport: ViewportConfig,
}

/// Where the options come from
#[derive(Debug, Deserialize, Serialize)]
pub struct OptionsConfig {
    /// JSON file with the options (relative to the working directory)
    #[serde(default = "default_options_path")]
    pub path: PathBuf,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            path: default_options_path(),
        }
    }
}

fn default_options_path() -> PathBuf {
    PathBuf::from(DEFAULT_OPTIONS_PATH)
}

/// The form hosting the select
#[derive(Debug, Deserialize, Serialize)]
pub struct FormConfig {
    /// Name of the form control
    #[serde(default = "default_field")]
    pub field: String,
    /// Start with the control disabled
    #[serde(default)]
    pub disabled: bool,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            field: default_field(),
            disabled: false,
        }
    }
}

fn default_field() -> String {
    DEFAULT_FIELD.to_string()
}

/// Select appearance
#[derive(Debug, Deserialize, Serialize)]
pub struct SelectSection {
    #[serde(default)]
    pub size: SelectSize,
    #[serde(default = "default_width")]
    pub width: f32,
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
}

impl Default for SelectSection {
    fn default() -> Self {
        Self {
            size: SelectSize::default(),
            width: default_width(),
            placeholder: default_placeholder(),
        }
    }
}

fn default_width() -> f32 {
    200.0
}

fn default_placeholder() -> String {
    "Select an option".to_string()
}

/// Size of the headless page
#[derive(Debug, Deserialize, Serialize)]
pub struct ViewportConfig {
    #[serde(default = "default_viewport_width")]
    pub width: f32,
    #[serde(default = "default_viewport_height")]
    pub height: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: default_viewport_width(),
            height: default_viewport_height(),
        }
    }
}

fn default_viewport_width() -> f32 {
    800.0
}

fn default_viewport_height() -> f32 {
    600.0
}

impl DroplineConfig {
    /// Load configuration from a file, falling back to defaults if it does
    /// not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| AppError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(&content).map_err(|source| AppError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
