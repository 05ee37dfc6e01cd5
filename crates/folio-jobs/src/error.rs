use std::io;
use std::path::PathBuf;

use folio_types::{EntityId, FieldError};

/// Errors produced while enqueuing or running jobs.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    /// The job's consumer has gone away.
    #[error("job queue is closed")]
    QueueClosed,

    /// The entity a job addresses does not exist.
    #[error("file set not found: {0}")]
    FileSetNotFound(EntityId),

    /// Reading a working file failed.
    #[error("cannot read working file {}: {source}", .path.display())]
    WorkingFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file set could not be saved after characterization.
    #[error("file set {id} failed validation after characterization: {errors:?}")]
    Invalid { id: EntityId, errors: Vec<FieldError> },

    /// Characterization or derivative generation failed.
    #[error("{stage} failed: {message}")]
    Processing { stage: &'static str, message: String },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Persistence failure from the repository or binary store.
    #[error("store error: {0}")]
    Store(#[from] folio_store::StoreError),

    /// I/O error on the spool file.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Convenience alias used throughout the jobs crate.
pub type JobResult<T> = Result<T, JobError>;
