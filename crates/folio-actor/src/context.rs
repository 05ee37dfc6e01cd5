use std::sync::Arc;

use folio_access::VisibilityPropagator;
use folio_jobs::JobQueue;
use folio_lock::{FileLockManager, LockCoordinator};
use folio_stage::{Stager, WorkingDirectory};
use folio_store::{BinaryStore, PersistenceGateway, Repository};
use tracing::info;

use crate::config::FolioConfig;
use crate::dispatch::EventDispatcher;
use crate::error::ActorResult;
use crate::event::EventSink;
use crate::hooks::Hooks;

/// The collaborators every [`crate::FileSetActor`] command runs against.
///
/// Built once per process and shared by reference across commands.
pub struct ActorContext {
    pub gateway: PersistenceGateway,
    pub binaries: Arc<dyn BinaryStore>,
    pub locks: Arc<dyn LockCoordinator>,
    pub stager: Arc<dyn Stager>,
    pub events: Arc<dyn EventSink>,
    pub visibility: VisibilityPropagator,
}

impl ActorContext {
    pub fn new(
        gateway: PersistenceGateway,
        binaries: Arc<dyn BinaryStore>,
        locks: Arc<dyn LockCoordinator>,
        stager: Arc<dyn Stager>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            gateway,
            binaries,
            locks,
            stager,
            events,
            visibility: VisibilityPropagator::new(),
        }
    }

    /// Wire the filesystem backends named by `config` around the given
    /// storage, queue and hooks.
    pub fn from_config(
        config: &FolioConfig,
        repository: Arc<dyn Repository>,
        binaries: Arc<dyn BinaryStore>,
        queue: Arc<dyn JobQueue>,
        hooks: Arc<dyn Hooks>,
    ) -> ActorResult<Self> {
        let stager = WorkingDirectory::new(&config.working_path)?;
        let locks = FileLockManager::new(&config.lock.dir, config.lock_config())?;
        info!(
            working_path = %stager.root().display(),
            lock_dir = %locks.dir().display(),
            "actor context ready"
        );

        Ok(Self::new(
            PersistenceGateway::new(repository, config.retry_policy()),
            binaries,
            Arc::new(locks),
            Arc::new(stager),
            Arc::new(EventDispatcher::new(queue, hooks)),
        ))
    }

    pub fn repository(&self) -> &Arc<dyn Repository> {
        self.gateway.repository()
    }
}

impl std::fmt::Debug for ActorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActorContext")
            .field("gateway", &self.gateway)
            .finish_non_exhaustive()
    }
}
