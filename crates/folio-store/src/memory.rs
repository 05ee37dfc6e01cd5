use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::RwLock;

use folio_types::{now_utc, EntityId, FileSet, User, Work};

use crate::binary::{version_label, StoredBinary, VersionRecord};
use crate::error::{StoreError, StoreResult};
use crate::traits::{BinaryStore, Repository};

/// In-memory, HashMap-based repository.
///
/// Intended for tests and embedding. Entities are cloned on read and write,
/// so callers never share state with the stored copy; concurrent writers
/// to the same entity get last-write-wins semantics, like a real backend.
pub struct InMemoryRepository {
    works: RwLock<HashMap<EntityId, Work>>,
    file_sets: RwLock<HashMap<EntityId, FileSet>>,
    /// Saves that will fail with a transient index error before succeeding.
    transient_failures: AtomicU32,
    save_attempts: AtomicUsize,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self {
            works: RwLock::new(HashMap::new()),
            file_sets: RwLock::new(HashMap::new()),
            transient_failures: AtomicU32::new(0),
            save_attempts: AtomicUsize::new(0),
        }
    }

    /// Make the next `count` save calls fail with
    /// [`StoreError::TransientIndex`], simulating an index outage.
    pub fn inject_transient_failures(&self, count: u32) {
        self.transient_failures.store(count, Ordering::SeqCst);
    }

    /// Total save calls seen, including failed ones.
    pub fn save_attempts(&self) -> usize {
        self.save_attempts.load(Ordering::SeqCst)
    }

    pub fn work_count(&self) -> usize {
        self.works.read().expect("lock poisoned").len()
    }

    pub fn file_set_count(&self) -> usize {
        self.file_sets.read().expect("lock poisoned").len()
    }

    fn begin_save(&self) -> StoreResult<()> {
        self.save_attempts.fetch_add(1, Ordering::SeqCst);
        let injected = self
            .transient_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if injected.is_ok() {
            return Err(StoreError::TransientIndex(
                "simulated index outage".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for InMemoryRepository {
    fn save_work(&self, work: &mut Work) -> StoreResult<bool> {
        self.begin_save()?;
        let errors = work.validate();
        work.rejections.clear();
        if !errors.is_empty() {
            work.errors = errors;
            return Ok(false);
        }
        let id = work.id.get_or_insert_with(EntityId::mint).clone();
        work.errors.clear();
        self.works
            .write()
            .expect("lock poisoned")
            .insert(id, work.clone());
        Ok(true)
    }

    fn find_work(&self, id: &EntityId) -> StoreResult<Option<Work>> {
        Ok(self.works.read().expect("lock poisoned").get(id).cloned())
    }

    fn save_file_set(&self, file_set: &mut FileSet) -> StoreResult<bool> {
        self.begin_save()?;
        let errors = file_set.validate();
        file_set.rejections.clear();
        if !errors.is_empty() {
            file_set.errors = errors;
            return Ok(false);
        }
        let id = file_set.id.get_or_insert_with(EntityId::mint).clone();
        file_set.errors.clear();
        self.file_sets
            .write()
            .expect("lock poisoned")
            .insert(id, file_set.clone());
        Ok(true)
    }

    fn find_file_set(&self, id: &EntityId) -> StoreResult<Option<FileSet>> {
        Ok(self.file_sets.read().expect("lock poisoned").get(id).cloned())
    }

    fn destroy_file_set(&self, id: &EntityId) -> StoreResult<bool> {
        Ok(self
            .file_sets
            .write()
            .expect("lock poisoned")
            .remove(id)
            .is_some())
    }
}

impl std::fmt::Debug for InMemoryRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryRepository")
            .field("works", &self.work_count())
            .field("file_sets", &self.file_set_count())
            .finish()
    }
}

#[derive(Default)]
struct BinaryHistory {
    current: Option<StoredBinary>,
    versions: Vec<(VersionRecord, StoredBinary)>,
}

/// In-memory versioned binary store.
#[derive(Default)]
pub struct InMemoryBinaryStore {
    binaries: RwLock<HashMap<EntityId, BinaryHistory>>,
}

impl InMemoryBinaryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BinaryStore for InMemoryBinaryStore {
    fn write(&self, file_set: &EntityId, binary: StoredBinary) -> StoreResult<()> {
        let mut map = self.binaries.write().expect("lock poisoned");
        map.entry(file_set.clone()).or_default().current = Some(binary);
        Ok(())
    }

    fn current(&self, file_set: &EntityId) -> StoreResult<Option<StoredBinary>> {
        let map = self.binaries.read().expect("lock poisoned");
        Ok(map.get(file_set).and_then(|h| h.current.clone()))
    }

    fn create_version(&self, file_set: &EntityId, creator: &User) -> StoreResult<VersionRecord> {
        let mut map = self.binaries.write().expect("lock poisoned");
        let history = map
            .get_mut(file_set)
            .ok_or_else(|| StoreError::NoOriginalFile(file_set.clone()))?;
        let current = history
            .current
            .clone()
            .ok_or_else(|| StoreError::NoOriginalFile(file_set.clone()))?;
        let record = VersionRecord {
            label: version_label(history.versions.len() + 1),
            created_at: now_utc(),
            creator: creator.user_key().to_string(),
            digest: current.digest.clone(),
            size: current.size(),
        };
        history.versions.push((record.clone(), current));
        Ok(record)
    }

    fn restore_version(&self, file_set: &EntityId, revision: &str) -> StoreResult<()> {
        let mut map = self.binaries.write().expect("lock poisoned");
        let not_found = || StoreError::VersionNotFound {
            id: file_set.clone(),
            revision: revision.to_string(),
        };
        let history = map.get_mut(file_set).ok_or_else(not_found)?;
        let restored = history
            .versions
            .iter()
            .find(|(record, _)| record.label == revision)
            .map(|(_, binary)| binary.clone())
            .ok_or_else(not_found)?;
        history.current = Some(restored);
        Ok(())
    }

    fn versions(&self, file_set: &EntityId) -> StoreResult<Vec<VersionRecord>> {
        let map = self.binaries.read().expect("lock poisoned");
        Ok(map
            .get(file_set)
            .map(|h| h.versions.iter().map(|(record, _)| record.clone()).collect())
            .unwrap_or_default())
    }
}

impl std::fmt::Debug for InMemoryBinaryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.binaries.read().expect("lock poisoned").len();
        f.debug_struct("InMemoryBinaryStore")
            .field("binaries", &count)
            .finish()
    }
}
