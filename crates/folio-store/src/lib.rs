//! Persistence boundary for Folio.
//!
//! Folio does not implement a repository backend; it depends on two
//! collaborator contracts and ships in-memory implementations of both for
//! tests and embedding:
//!
//! - [`Repository`] -- save/find/destroy for works and file sets. Saves return
//!   `Ok(false)` on semantic validation failure and
//!   [`StoreError::TransientIndex`] when the search index is momentarily
//!   unavailable.
//! - [`BinaryStore`] -- the original file of each file set with its version
//!   history (write, read back, snapshot, restore).
//!
//! [`PersistenceGateway`] wraps repository saves with bounded retry on
//! transient errors.
//!
//! # Design Rules
//!
//! 1. Identifiers are assigned on first successful save, never before.
//! 2. A save that fails validation leaves the stored copy untouched.
//! 3. Transient failures are retried; semantic failures never are.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod binary;
pub mod error;
pub mod gateway;
pub mod memory;
pub mod traits;

pub use binary::{StoredBinary, VersionRecord};
pub use error::{StoreError, StoreResult};
pub use gateway::{PersistenceGateway, RetryPolicy};
pub use memory::{InMemoryBinaryStore, InMemoryRepository};
pub use traits::{BinaryStore, Repository};
