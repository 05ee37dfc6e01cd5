use folio_types::{EntityId, FileSet, User};

use crate::error::ActorResult;

/// Extension points run after orchestrator workflows.
///
/// Hooks run synchronously on the calling thread; a failing hook fails the
/// workflow that triggered it.
pub trait Hooks: Send + Sync {
    fn after_revert_content(&self, file_set: &FileSet, user: &User, revision: &str) -> ActorResult<()>;
    fn after_update_content(&self, file_set: &FileSet, user: &User) -> ActorResult<()>;
    fn after_update_metadata(&self, file_set: &FileSet, user: &User) -> ActorResult<()>;
    fn after_destroy(&self, id: &EntityId, user: &User) -> ActorResult<()>;
}

pub struct NoOpHooks;

impl Hooks for NoOpHooks {
    fn after_revert_content(&self, _file_set: &FileSet, _user: &User, _revision: &str) -> ActorResult<()> {
        Ok(())
    }

    fn after_update_content(&self, _file_set: &FileSet, _user: &User) -> ActorResult<()> {
        Ok(())
    }

    fn after_update_metadata(&self, _file_set: &FileSet, _user: &User) -> ActorResult<()> {
        Ok(())
    }

    fn after_destroy(&self, _id: &EntityId, _user: &User) -> ActorResult<()> {
        Ok(())
    }
}
