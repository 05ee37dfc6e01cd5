use folio_types::{EntityId, FileSet, User, Work};

use crate::binary::{StoredBinary, VersionRecord};
use crate::error::{StoreError, StoreResult};

/// Persistence backend for works and file sets.
///
/// All implementations must satisfy these invariants:
/// - `save_*` assigns an identifier on the first successful save and never
///   changes it afterwards.
/// - `save_*` returns `Ok(false)` when the entity fails semantic validation,
///   recording the reasons on the entity's `errors`. Nothing is stored.
/// - Every validated save consumes the entity's pending `rejections`.
/// - `save_*` returns [`StoreError::TransientIndex`] when the index backend
///   is momentarily unavailable. Callers may retry.
/// - Saves are whole-entity, last-write-wins. Callers that read-modify-write
///   a shared entity must serialize themselves.
pub trait Repository: Send + Sync {
    fn save_work(&self, work: &mut Work) -> StoreResult<bool>;

    /// Returns `Ok(None)` if no work has this id.
    fn find_work(&self, id: &EntityId) -> StoreResult<Option<Work>>;

    fn save_file_set(&self, file_set: &mut FileSet) -> StoreResult<bool>;

    fn find_file_set(&self, id: &EntityId) -> StoreResult<Option<FileSet>>;

    /// Remove a file set. Returns `true` if it existed.
    fn destroy_file_set(&self, id: &EntityId) -> StoreResult<bool>;

    /// Replace `work` with its stored copy.
    ///
    /// Fails with [`StoreError::Unpersisted`] for new records and
    /// [`StoreError::NotFound`] if the stored copy has gone.
    fn reload_work(&self, work: &mut Work) -> StoreResult<()> {
        let id = work.id.clone().ok_or(StoreError::Unpersisted("work"))?;
        *work = self.find_work(&id)?.ok_or(StoreError::NotFound(id))?;
        Ok(())
    }
}

/// Versioned storage for each file set's original file.
pub trait BinaryStore: Send + Sync {
    /// Replace the current content. Does not create a version record.
    fn write(&self, file_set: &EntityId, binary: StoredBinary) -> StoreResult<()>;

    /// The current content, or `Ok(None)` if nothing was ever written.
    fn current(&self, file_set: &EntityId) -> StoreResult<Option<StoredBinary>>;

    /// Snapshot the current content as a new version record.
    fn create_version(&self, file_set: &EntityId, creator: &User) -> StoreResult<VersionRecord>;

    /// Make the named version's content current again.
    ///
    /// Fails with [`StoreError::VersionNotFound`] if there is no such version.
    fn restore_version(&self, file_set: &EntityId, revision: &str) -> StoreResult<()>;

    /// Version history, oldest first.
    fn versions(&self, file_set: &EntityId) -> StoreResult<Vec<VersionRecord>>;

    /// The current content, failing if there is none.
    fn original_file(&self, file_set: &EntityId) -> StoreResult<StoredBinary> {
        self.current(file_set)?
            .ok_or_else(|| StoreError::NoOriginalFile(file_set.clone()))
    }
}
