use std::sync::Arc;

use folio_jobs::JobQueue;
use tracing::debug;

use crate::error::ActorResult;
use crate::event::{ActorEvent, EventSink};
use crate::hooks::Hooks;

/// Routes job requests to a queue and lifecycle events to hooks.
#[derive(Clone)]
pub struct EventDispatcher {
    queue: Arc<dyn JobQueue>,
    hooks: Arc<dyn Hooks>,
}

impl EventDispatcher {
    pub fn new(queue: Arc<dyn JobQueue>, hooks: Arc<dyn Hooks>) -> Self {
        Self { queue, hooks }
    }
}

impl EventSink for EventDispatcher {
    fn emit(&self, event: ActorEvent<'_>) -> ActorResult<()> {
        debug!(event = event.name(), "dispatching");
        match event {
            ActorEvent::JobRequested(job) => self.queue.enqueue(job)?,
            ActorEvent::ContentReverted {
                file_set,
                user,
                revision,
            } => self.hooks.after_revert_content(file_set, user, revision)?,
            ActorEvent::ContentUpdated { file_set, user } => {
                self.hooks.after_update_content(file_set, user)?
            }
            ActorEvent::MetadataUpdated { file_set, user } => {
                self.hooks.after_update_metadata(file_set, user)?
            }
            ActorEvent::Destroyed { id, user } => self.hooks.after_destroy(id, user)?,
        }
        Ok(())
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher").finish_non_exhaustive()
    }
}
