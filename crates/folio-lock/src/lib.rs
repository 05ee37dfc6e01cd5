//! Named mutual exclusion for Folio.
//!
//! A lock is a named, exclusive token held for the duration of one critical
//! section and never persisted beyond it. Folio uses one lock per parent
//! work to serialize appends to the work's ordered member list.
//!
//! # Modules
//!
//! - [`error`] - Error types for lock operations
//! - [`traits`] - The [`LockCoordinator`] trait and [`LockGuard`]
//! - [`names`] - Lock key validation and lock-file naming
//! - [`memory`] - [`InMemoryLockManager`], effective across threads of one process
//! - [`file`] - [`FileLockManager`], effective across processes via `flock`
//!
//! Locks are not reentrant. Acquiring a key already held by the calling
//! thread fails with [`LockError::Reentrant`] instead of deadlocking.

pub mod error;
pub mod file;
pub mod memory;
pub mod names;
pub mod traits;

pub use error::{LockError, Result};
pub use file::FileLockManager;
pub use memory::InMemoryLockManager;
pub use names::validate_lock_key;
pub use traits::{LockConfig, LockCoordinator, LockCoordinatorExt, LockGuard};
