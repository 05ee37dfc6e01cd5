use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid identifier {id:?}: {reason}")]
    InvalidId { id: String, reason: String },

    #[error("unknown attribute: {0}")]
    UnknownAttribute(String),

    #[error("attribute {field} expects {expected}")]
    InvalidAttributeValue { field: String, expected: String },

    #[error("invalid visibility value: {0}")]
    InvalidVisibility(String),

    #[error("invalid date for {field}: {value}")]
    InvalidDate { field: String, value: String },
}

/// Convenience alias for type-level results.
pub type TypeResult<T> = Result<T, TypeError>;

/// A semantic validation failure recorded against one field of an entity.
///
/// Entities accumulate these; a repository refuses to persist an entity that
/// carries any.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}
