//! Working-directory staging for Folio.
//!
//! Uploaded bytes are copied to a local working directory before they are
//! ingested into preservation storage and characterized. The path is a pure
//! function of the entity id and the filename:
//!
//! ```text
//! <root>/<shard1>/<shard2>/<shard3>/<shard4>/<filename>
//! ```
//!
//! where the shards are the first four two-character chunks of the id. This
//! bounds directory fan-out. Staging the same id and name again overwrites.
//!
//! Staged files are not owned by any persisted entity; pruning them once
//! they reach preservation storage is left to an external sweeper.

pub mod error;
pub mod working_dir;

pub use error::{StageError, StageResult};
pub use working_dir::{Stager, WorkingDirectory};
