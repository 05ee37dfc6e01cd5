use std::path::{Path, PathBuf};

use folio_access::assigns_visibility;
use folio_jobs::Job;
use folio_lock::LockCoordinatorExt;
use folio_stage::StageResult;
use folio_store::StoreError;
use folio_types::{now_utc, Attributes, EntityId, FileSet, User, Work};
use tracing::{debug, info, warn};

use crate::context::ActorContext;
use crate::error::{ActorError, ActorResult};
use crate::event::ActorEvent;
use crate::upload::Upload;

/// Runs one command against one file set on behalf of one user.
///
/// The actor borrows the file set and user for the duration of the command.
/// Workflows that save the file set return `Ok(false)` when the save fails
/// validation; the reasons are left on `file_set.errors`.
pub struct FileSetActor<'a> {
    ctx: &'a ActorContext,
    file_set: &'a mut FileSet,
    user: &'a User,
}

impl<'a> FileSetActor<'a> {
    pub fn new(ctx: &'a ActorContext, file_set: &'a mut FileSet, user: &'a User) -> Self {
        Self {
            ctx,
            file_set,
            user,
        }
    }

    pub fn file_set(&self) -> &FileSet {
        &*self.file_set
    }

    pub fn user(&self) -> &User {
        self.user
    }

    /// Stamp depositor and dates, apply explicit access keys from `params`,
    /// and attach to `work` if one is given.
    ///
    /// Only the access keys of `params` are read. Without a work nothing is
    /// persisted.
    pub fn create_metadata(&mut self, work: Option<&mut Work>, params: Attributes) -> ActorResult<()> {
        self.create_metadata_with(work, params, |_| {})
    }

    /// [`Self::create_metadata`], then hand the file set to `on_complete`.
    pub fn create_metadata_with<F>(
        &mut self,
        work: Option<&mut Work>,
        mut params: Attributes,
        on_complete: F,
    ) -> ActorResult<()>
    where
        F: FnOnce(&FileSet),
    {
        let now = now_utc();
        self.file_set.apply_depositor_metadata(self.user);
        self.file_set.date_uploaded = Some(now);
        self.file_set.date_modified = Some(now);
        self.file_set.creator = vec![self.user.user_key().to_string()];

        let explicit = assigns_visibility(&params);
        if explicit {
            self.ctx
                .visibility
                .interpret_visibility(&mut *self.file_set, &mut params);
        }

        if let Some(work) = work {
            self.attach_to_work(work, explicit)?;
        }

        on_complete(&*self.file_set);
        Ok(())
    }

    /// Append the file set to `work`'s ordered members.
    ///
    /// Holding the work's lock: reload the work, inherit its visibility
    /// unless `explicit_visibility`, save the file set, append it, fill in
    /// representative and thumbnail, save the work. Either save failing
    /// validation is an error here. The lock is released on every path.
    pub fn attach_to_work(&mut self, work: &mut Work, explicit_visibility: bool) -> ActorResult<()> {
        let Some(work_id) = work.id.clone() else {
            // Nobody else can hold a reference to a work that has no id yet.
            debug!("attaching to unpersisted work without a lock");
            return self.attach_locked(work, explicit_visibility);
        };

        let ctx = self.ctx;
        ctx.locks.acquire_and_run(work_id.as_str(), || {
            self.attach_locked(work, explicit_visibility)
        })
    }

    fn attach_locked(&mut self, work: &mut Work, explicit_visibility: bool) -> ActorResult<()> {
        let ctx = self.ctx;
        if !work.is_new_record() {
            ctx.repository().reload_work(work)?;
        }
        if !explicit_visibility {
            ctx.visibility.copy_visibility(&*work, &mut *self.file_set);
        }

        if !ctx.gateway.save_file_set(self.file_set)? {
            return Err(StoreError::Invalid {
                entity: "file_set",
                errors: self.file_set.errors.clone(),
            }
            .into());
        }
        let member = self.persisted_id()?;

        work.append_member(member.clone());
        work.set_representative_if_unset(&member);
        work.set_thumbnail_if_unset(&member);
        if !ctx.gateway.save_work(work)? {
            return Err(StoreError::Invalid {
                entity: "work",
                errors: work.errors.clone(),
            }
            .into());
        }

        info!(
            work = %work.id.as_ref().map(EntityId::as_str).unwrap_or_default(),
            file_set = %member,
            members = work.member_count(),
            "file set attached"
        );
        Ok(())
    }

    /// Default label and title from the upload, save, stage under the
    /// label, and dispatch ingest and characterization.
    ///
    /// Nothing is staged or dispatched unless the save succeeds. A staging
    /// failure after the save is [`ActorError::StagingFailed`].
    pub fn create_content(&mut self, upload: &Upload) -> ActorResult<bool> {
        let label = self.default_label(upload)?;
        if self.file_set.title.is_empty() {
            self.file_set.title = vec![label.clone()];
        }

        if !self.ctx.gateway.save_file_set(self.file_set)? {
            debug!(errors = ?self.file_set.errors, "file set not saved; content not staged");
            return Ok(false);
        }
        let id = self.persisted_id()?;

        let path = self
            .stage_upload(&id, &label, upload)
            .map_err(|source| ActorError::StagingFailed {
                id: id.clone(),
                source,
            })?;
        self.request_ingest(&id, &path, upload)?;
        info!(id = %id, path = %path.display(), "content created");
        Ok(true)
    }

    /// Restore `revision` as the current content and re-characterize it.
    pub fn revert_content(&mut self, revision: &str) -> ActorResult<bool> {
        let id = self.persisted_id()?;
        let ctx = self.ctx;

        ctx.binaries.restore_version(&id, revision)?;
        if !ctx.gateway.save_file_set(self.file_set)? {
            return Ok(false);
        }
        let version = ctx.binaries.create_version(&id, self.user)?;

        let original = ctx.binaries.original_file(&id)?;
        let path = ctx
            .stager
            .stage(&id, &original.original_name, &mut original.content.as_slice())?;

        ctx.events
            .emit(ActorEvent::JobRequested(Job::characterize(id.clone(), &path)))?;
        ctx.events.emit(ActorEvent::ContentReverted {
            file_set: &*self.file_set,
            user: self.user,
            revision,
        })?;
        info!(id = %id, revision, version = %version.label, "content reverted");
        Ok(true)
    }

    /// Stage new content over the label's working file and dispatch ingest
    /// and characterization. The file set itself is not saved.
    pub fn update_content(&mut self, upload: &Upload) -> ActorResult<bool> {
        let id = self.persisted_id()?;
        let label = self.default_label(upload)?;

        let path = self.stage_upload(&id, &label, upload)?;
        self.request_ingest(&id, &path, upload)?;
        self.ctx.events.emit(ActorEvent::ContentUpdated {
            file_set: &*self.file_set,
            user: self.user,
        })?;
        info!(id = %id, path = %path.display(), "content updated");
        Ok(true)
    }

    /// Apply access keys, assign the remaining attributes, and save with
    /// retry. `after_update_metadata` runs only on a successful save.
    pub fn update_metadata(&mut self, mut attributes: Attributes) -> ActorResult<bool> {
        let ctx = self.ctx;
        let user = self.user;

        ctx.visibility
            .interpret_visibility(&mut *self.file_set, &mut attributes);
        self.file_set.assign_attributes(&attributes)?;
        self.file_set.date_modified = Some(now_utc());

        ctx.gateway.save_file_set_then(self.file_set, |saved| {
            ctx.events.emit(ActorEvent::MetadataUpdated {
                file_set: saved,
                user,
            })
        })
    }

    pub fn destroy(&mut self) -> ActorResult<()> {
        let id = self.persisted_id()?;
        if !self.ctx.repository().destroy_file_set(&id)? {
            warn!(id = %id, "file set already removed");
        }
        self.ctx.events.emit(ActorEvent::Destroyed {
            id: &id,
            user: self.user,
        })
    }

    /// The file set's label, first taking it from the upload if unset.
    fn default_label(&mut self, upload: &Upload) -> ActorResult<String> {
        if let Some(label) = &self.file_set.label {
            return Ok(label.clone());
        }
        let name = upload.file_name().ok_or(ActorError::MissingFileName)?;
        self.file_set.label = Some(name.to_string());
        Ok(name.to_string())
    }

    fn persisted_id(&self) -> ActorResult<EntityId> {
        self.file_set
            .id
            .clone()
            .ok_or_else(|| StoreError::Unpersisted("file_set").into())
    }

    fn stage_upload(&self, id: &EntityId, name: &str, upload: &Upload) -> StageResult<PathBuf> {
        let mut reader = upload.open()?;
        self.ctx.stager.stage(id, name, &mut reader)
    }

    fn request_ingest(&self, id: &EntityId, path: &Path, upload: &Upload) -> ActorResult<()> {
        let mime_type = upload.content_type().map(str::to_string);
        self.ctx.events.emit(ActorEvent::JobRequested(Job::ingest_file(
            id.clone(),
            path,
            mime_type,
            self.user,
        )))?;
        self.ctx
            .events
            .emit(ActorEvent::JobRequested(Job::characterize(id.clone(), path)))
    }
}

impl std::fmt::Debug for FileSetActor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSetActor")
            .field("file_set", &self.file_set.id)
            .field("user", &self.user)
            .finish()
    }
}
