//! Asynchronous work for Folio.
//!
//! The orchestrator hands immutable [`Job`]s to a [`JobQueue`] and never
//! tracks their completion. This crate provides:
//!
//! - [`Job`] -- `{kind, entity_id, payload}` instructions
//! - [`JobQueue`] -- the fire-and-forget enqueue contract
//! - [`InMemoryJobQueue`] -- records jobs for tests and embedding
//! - [`ChannelJobQueue`] -- hands jobs to an in-process consumer over a tokio channel
//! - [`SpoolJobQueue`] -- crash-recoverable, CRC-framed job log on disk
//! - [`JobRunner`] -- the ingest, characterization and derivative job bodies
//!
//! Scheduling, retries and worker pools belong to whatever engine drains the
//! queue and are not defined here.

pub mod channel;
pub mod error;
pub mod job;
pub mod memory;
pub mod spool;
pub mod traits;
pub mod worker;

pub use channel::{ChannelJobQueue, JobReceiver};
pub use error::{JobError, JobResult};
pub use job::{Job, JobKind, JobPayload};
pub use memory::InMemoryJobQueue;
pub use spool::{SpoolConfig, SpoolJobQueue};
pub use traits::JobQueue;
pub use worker::{BasicCharacterizer, Characterizer, DerivativeGenerator, JobRunner, NoDerivatives};
