//! The Folio file set orchestrator.
//!
//! [`FileSetActor`] sequences every workflow that touches a file set:
//! metadata creation, content ingestion, content revert and update,
//! metadata update, destruction, and attachment to a parent work under a
//! named lock.
//!
//! The actor never calls the job queue or extension hooks directly. It
//! emits [`ActorEvent`]s to an [`EventSink`]; the default sink,
//! [`EventDispatcher`], forwards job requests to a
//! [`folio_jobs::JobQueue`] and lifecycle events to [`Hooks`].
//!
//! All collaborators live in an [`ActorContext`], built explicitly or from a
//! [`FolioConfig`].

pub mod actor;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod hooks;
pub mod upload;

pub use actor::FileSetActor;
pub use config::{FolioConfig, JobSettings, LockSettings, RetrySettings};
pub use context::ActorContext;
pub use dispatch::EventDispatcher;
pub use error::{ActorError, ActorResult};
pub use event::{ActorEvent, EventSink};
pub use hooks::{Hooks, NoOpHooks};
pub use upload::Upload;
