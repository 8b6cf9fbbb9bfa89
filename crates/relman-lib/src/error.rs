//! Error types for `relman-lib`.
//!
//! Only whole-operation failures live here. Per-record import failures are
//! expected outcomes and are reported through [`crate::import::SkipReason`].

use std::path::PathBuf;
use thiserror::Error;

/// Primary error type for relation export/import operations.
#[derive(Error, Debug)]
pub enum RelationError {
    // === Document Errors ===
    /// The import document does not have the expected shape.
    #[error("Invalid file format: {reason}")]
    Format { reason: String },

    // === Relation Errors ===
    /// A relation with this ID is already registered.
    #[error("Relation already exists: {id}")]
    DuplicateRelation { id: String },

    /// A relation references a layer that is not loaded.
    #[error("Layer not found: {id}")]
    LayerNotFound { id: String },

    // === Validation Errors ===
    /// Field validation failed.
    #[error("Validation failed: {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Multiple validation errors occurred.
    #[error("Validation errors: {}", format_errors(.errors))]
    ValidationErrors { errors: Vec<ValidationError> },

    // === Configuration Errors ===
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    // === I/O Errors ===
    /// File not found at the specified path.
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Operational Errors ===
    /// Nothing to export, import, or save.
    #[error("Nothing to do: {reason}")]
    NothingToDo { reason: String },
}

/// A single validation rule violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Join validation errors into one `field: message; field: message` string.
#[must_use]
pub fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl RelationError {
    #[must_use]
    pub fn format(reason: impl Into<String>) -> Self {
        Self::Format {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn from_validation_errors(errors: Vec<ValidationError>) -> Self {
        if errors.len() == 1 {
            let err = &errors[0];
            Self::Validation {
                field: err.field.clone(),
                reason: err.message.clone(),
            }
        } else {
            Self::ValidationErrors { errors }
        }
    }
}

/// Result type using `RelationError`.
pub type Result<T> = std::result::Result<T, RelationError>;
