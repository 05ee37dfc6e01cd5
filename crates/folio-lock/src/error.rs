//! Error types for lock operations.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while acquiring or releasing a lock.
#[derive(Debug, Error)]
pub enum LockError {
    /// The lock was not obtained within the configured timeout.
    #[error("timed out after {waited:?} waiting for lock {key}")]
    Timeout { key: String, waited: Duration },

    /// The calling thread already holds this lock.
    #[error("lock {key} is already held by the current thread")]
    Reentrant { key: String },

    /// The lock key is invalid.
    #[error("invalid lock key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },

    /// The OS refused the lock for a reason other than contention.
    #[error("failed to lock {key}: {source}")]
    LockFailed {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// I/O error while preparing lock files.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for lock operations.
pub type Result<T> = std::result::Result<T, LockError>;
