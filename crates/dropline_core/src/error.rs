//! Error types for dropline_core

use thiserror::Error;

use crate::tree::ElementId;

/// Errors raised by element tree mutations
#[derive(Error, Debug)]
pub enum TreeError {
    /// The layout engine rejected an operation
    #[error("layout engine error: {0}")]
    Layout(#[from] taffy::TaffyError),

    /// The element id is not (or no longer) part of the tree
    #[error("unknown element {0:?}")]
    UnknownElement(ElementId),

    /// The root element lives as long as the tree
    #[error("the root element cannot be removed")]
    RootRemoval,
}

/// Result type for element tree operations
pub type Result<T> = std::result::Result<T, TreeError>;
