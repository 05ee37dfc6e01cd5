use chrono::{DateTime, Utc};

/// Reasons a visibility request is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    #[error("{field} is required when visibility is {visibility}")]
    MissingDate {
        visibility: &'static str,
        field: &'static str,
    },

    #[error("{field} must be a date, got {value:?}")]
    InvalidDate { field: &'static str, value: String },

    #[error("{field} must be in the future, got {date}")]
    NotInFuture {
        field: &'static str,
        date: DateTime<Utc>,
    },

    #[error("{field} must be one of open, authenticated, restricted; got {value:?}")]
    InvalidVisibility { field: &'static str, value: String },

    #[error("{field} must be a single string")]
    NotAString { field: &'static str },
}

impl AccessError {
    /// The attribute the rejection is reported against.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingDate { field, .. }
            | Self::InvalidDate { field, .. }
            | Self::NotInFuture { field, .. }
            | Self::InvalidVisibility { field, .. }
            | Self::NotAString { field } => field,
        }
    }
}

pub type AccessResult<T> = Result<T, AccessError>;
