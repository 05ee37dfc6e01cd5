use folio_types::{EntityId, FieldError};

/// Errors from repository and binary store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested entity was not found.
    #[error("entity not found: {0}")]
    NotFound(EntityId),

    /// The search index backend is momentarily unavailable. Retry-worthy.
    #[error("index backend unavailable: {0}")]
    TransientIndex(String),

    /// The operation needs a persisted entity but got a new record.
    #[error("{0} has not been persisted")]
    Unpersisted(&'static str),

    /// The file set has no original file in the binary store.
    #[error("no original file for {0}")]
    NoOriginalFile(EntityId),

    /// The requested version does not exist in the binary's history.
    #[error("version {revision} not found for {id}")]
    VersionNotFound { id: EntityId, revision: String },

    /// An entity failed validation where a successful save was required.
    #[error("{entity} failed validation: {}", format_errors(.errors))]
    Invalid {
        entity: &'static str,
        errors: Vec<FieldError>,
    },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// `true` for infrastructure failures that a retry may resolve.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransientIndex(_))
    }
}

fn format_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
