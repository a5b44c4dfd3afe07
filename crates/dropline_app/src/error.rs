//! Error types for the dropline shell

use std::path::PathBuf;

use dropline_core::TreeError;
use thiserror::Error;

/// Failures reported by an option source
#[derive(Error, Debug)]
pub enum SourceError {
    /// The options file could not be read
    #[error("failed to read options from {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The options file is not a JSON array of `{label, value}` records
    #[error("failed to parse options in {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors that can occur in the dropline shell
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Failed to read the configuration file
    #[error("failed to read config {path}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the configuration file
    #[error("failed to parse config {path}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A line of an interaction script is not a known command
    #[error("script line {line}: {message}")]
    Script { line: usize, message: String },

    /// Element tree failure while building or updating the page
    #[error("page error: {0}")]
    Tree(#[from] TreeError),
}

/// Result type for dropline shell operations
pub type Result<T> = std::result::Result<T, AppError>;
