//! Error types for the stage crate.

use std::path::PathBuf;

/// Errors that can occur while staging a file.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    /// The filename cannot be used as a single path segment.
    #[error("invalid file name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    /// Filesystem failure while creating directories or copying bytes.
    #[error("failed to stage {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias for stage results.
pub type StageResult<T> = Result<T, StageError>;
