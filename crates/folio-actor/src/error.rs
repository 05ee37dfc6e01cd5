use folio_types::EntityId;

/// Errors surfaced by orchestrator workflows.
///
/// Validation failures of the file set's own save are not errors; the
/// workflow returns `Ok(false)` and the reasons are on the file set.
#[derive(Debug, thiserror::Error)]
pub enum ActorError {
    #[error(transparent)]
    Store(#[from] folio_store::StoreError),

    #[error(transparent)]
    Lock(#[from] folio_lock::LockError),

    #[error(transparent)]
    Stage(#[from] folio_stage::StageError),

    #[error(transparent)]
    Job(#[from] folio_jobs::JobError),

    #[error("invalid attributes: {0}")]
    Attributes(#[from] folio_types::TypeError),

    /// The file set was saved but its content could not be staged. It
    /// exists without staged content and no jobs were dispatched.
    #[error("file set {id} was saved but staging its content failed: {source}")]
    StagingFailed {
        id: EntityId,
        #[source]
        source: folio_stage::StageError,
    },

    /// The upload has neither a declared filename nor a usable path.
    #[error("upload has no file name")]
    MissingFileName,

    /// A hook rejected or failed to process an event.
    #[error("{hook} hook failed: {message}")]
    Hook { hook: &'static str, message: String },

    #[error("configuration error: {0}")]
    Config(String),
}

pub type ActorResult<T> = Result<T, ActorError>;
