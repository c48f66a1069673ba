//! Error types for catalog operations
//!
//! Covers validation failures on profile mutation, inquiries and ratings,
//! and misuse of the reorder session.

use thiserror::Error;

/// Catalog error types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// A required field was not supplied
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// A field was supplied with an unusable value
    #[error("Invalid value for {field}: {message}")]
    InvalidValue {
        /// Field name.
        field: &'static str,
        /// What was wrong with it.
        message: String,
    },

    /// Onboarding was already completed for this profile
    #[error("Onboarding already completed")]
    AlreadyOnboarded,

    /// A referenced specialty, subspecialty or category does not exist
    #[error("Unknown {kind}: {id}")]
    UnknownReference {
        /// Reference kind (e.g. "subspecialty").
        kind: &'static str,
        /// Referenced id.
        id: String,
    },

    /// An item referenced by a reorder is not in the list
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// A drop was attempted without a drag in progress
    #[error("No drag in progress")]
    NoActiveDrag,
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

impl CatalogError {
    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            CatalogError::MissingField(_) => "MISSING_FIELD",
            CatalogError::InvalidValue { .. } => "INVALID_VALUE",
            CatalogError::AlreadyOnboarded => "ALREADY_ONBOARDED",
            CatalogError::UnknownReference { .. } => "UNKNOWN_REFERENCE",
            CatalogError::ItemNotFound(_) => "ITEM_NOT_FOUND",
            CatalogError::NoActiveDrag => "NO_ACTIVE_DRAG",
        }
    }
}
