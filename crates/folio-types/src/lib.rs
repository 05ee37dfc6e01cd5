//! Foundation types for Folio.
//!
//! Folio ingests uploaded binaries into a repository of composite digital
//! objects. Every other Folio crate depends on `folio-types`.
//!
//! # Key Types
//!
//! - [`EntityId`] - Repository identifier, sharded for working-directory paths
//! - [`User`] - The acting depositor or editor
//! - [`Work`] - Aggregating entity with an ordered member list
//! - [`FileSet`] - One uploaded file plus its descriptive metadata
//! - [`Visibility`], [`Embargo`], [`Lease`] - Access state
//! - [`schema`] - The descriptive metadata field table
//! - [`Attributes`] - Loosely-typed attribute maps supplied by callers

pub mod access;
pub mod error;
pub mod file_set;
pub mod id;
pub mod schema;
pub mod user;
pub mod work;

pub use access::{AccessControlled, Embargo, Lease, Visibility};
pub use error::{FieldError, TypeError, TypeResult};
pub use file_set::{Characterization, FileSet};
pub use id::EntityId;
pub use schema::{Cardinality, FieldKind, FieldSpec, IndexHint};
pub use user::User;
pub use work::Work;

/// Attribute map supplied by callers for metadata and visibility updates.
///
/// Keys are schema field names (plus the visibility control keys); values are
/// JSON strings, arrays of strings, or `null`.
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// Current UTC time, used for `date_uploaded` / `date_modified` stamping.
pub fn now_utc() -> chrono::DateTime<chrono::Utc> {
    chrono::Utc::now()
}
