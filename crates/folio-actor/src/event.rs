use folio_jobs::Job;
use folio_types::{EntityId, FileSet, User};

use crate::error::ActorResult;

/// Everything the orchestrator tells the outside world.
#[derive(Debug)]
pub enum ActorEvent<'a> {
    /// Asynchronous work should be scheduled.
    JobRequested(Job),
    ContentReverted {
        file_set: &'a FileSet,
        user: &'a User,
        revision: &'a str,
    },
    ContentUpdated {
        file_set: &'a FileSet,
        user: &'a User,
    },
    MetadataUpdated {
        file_set: &'a FileSet,
        user: &'a User,
    },
    Destroyed {
        id: &'a EntityId,
        user: &'a User,
    },
}

impl ActorEvent<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Self::JobRequested(_) => "job_requested",
            Self::ContentReverted { .. } => "after_revert_content",
            Self::ContentUpdated { .. } => "after_update_content",
            Self::MetadataUpdated { .. } => "after_update_metadata",
            Self::Destroyed { .. } => "after_destroy",
        }
    }
}

/// Receives orchestrator events in emission order.
///
/// Emission is synchronous; an error aborts the emitting workflow.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: ActorEvent<'_>) -> ActorResult<()>;
}
