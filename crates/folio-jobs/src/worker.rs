use std::fs;
use std::path::Path;
use std::sync::Arc;

use folio_access::VisibilityPropagator;
use folio_store::{BinaryStore, Repository, StoredBinary};
use folio_types::{now_utc, Characterization, EntityId, FileSet, User};
use tracing::{debug, info};

use crate::error::{JobError, JobResult};
use crate::job::{Job, JobPayload};
use crate::traits::JobQueue;

/// Extracts technical metadata from a working file onto its file set.
pub trait Characterizer: Send + Sync {
    fn characterize(&self, file_set: &mut FileSet, path: &Path) -> JobResult<()>;
}

/// Produces derivative artifacts (thumbnails, access copies) for a file set.
pub trait DerivativeGenerator: Send + Sync {
    fn create_derivatives(&self, file_set: &FileSet, path: &Path) -> JobResult<()>;
}

/// Records size, BLAKE3 digest and an extension-derived MIME type.
#[derive(Clone, Copy, Debug, Default)]
pub struct BasicCharacterizer;

impl Characterizer for BasicCharacterizer {
    fn characterize(&self, file_set: &mut FileSet, path: &Path) -> JobResult<()> {
        let bytes = read_working_file(path)?;
        file_set.characterization = Some(Characterization {
            mime_type: mime_from_extension(path).map(str::to_string),
            byte_size: bytes.len() as u64,
            digest: hex::encode(blake3::hash(&bytes).as_bytes()),
            characterized_at: now_utc(),
        });
        Ok(())
    }
}

/// Generates nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDerivatives;

impl DerivativeGenerator for NoDerivatives {
    fn create_derivatives(&self, _file_set: &FileSet, _path: &Path) -> JobResult<()> {
        Ok(())
    }
}

fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "pdf" => "application/pdf",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "tif" | "tiff" => "image/tiff",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "xml" => "application/xml",
        "json" => "application/json",
        "mp3" => "audio/mpeg",
        "wav" => "audio/x-wav",
        "mp4" => "video/mp4",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => return None,
    };
    Some(mime)
}

fn read_working_file(path: &Path) -> JobResult<Vec<u8>> {
    fs::read(path).map_err(|source| JobError::WorkingFile {
        path: path.to_path_buf(),
        source,
    })
}

/// Runs the body of each job kind against the repository and binary store.
///
/// `JobRunner` does not schedule or retry; whatever drains the queue calls
/// [`JobRunner::run`] once per delivered job.
pub struct JobRunner {
    repository: Arc<dyn Repository>,
    binaries: Arc<dyn BinaryStore>,
    queue: Arc<dyn JobQueue>,
    characterizer: Arc<dyn Characterizer>,
    derivatives: Arc<dyn DerivativeGenerator>,
}

impl JobRunner {
    pub fn new(
        repository: Arc<dyn Repository>,
        binaries: Arc<dyn BinaryStore>,
        queue: Arc<dyn JobQueue>,
    ) -> Self {
        Self {
            repository,
            binaries,
            queue,
            characterizer: Arc::new(BasicCharacterizer),
            derivatives: Arc::new(NoDerivatives),
        }
    }

    pub fn with_characterizer(mut self, characterizer: Arc<dyn Characterizer>) -> Self {
        self.characterizer = characterizer;
        self
    }

    pub fn with_derivatives(mut self, derivatives: Arc<dyn DerivativeGenerator>) -> Self {
        self.derivatives = derivatives;
        self
    }

    pub fn run(&self, job: &Job) -> JobResult<()> {
        debug!(job = %job, "running job");
        match &job.payload {
            JobPayload::IngestFile {
                working_path,
                mime_type,
                user_key,
            } => self.ingest_file(&job.entity_id, working_path, mime_type.clone(), user_key),
            JobPayload::Characterize { working_path } => {
                self.characterize(&job.entity_id, working_path)
            }
            JobPayload::CreateDerivatives { working_path } => {
                self.create_derivatives(&job.entity_id, working_path)
            }
        }
    }

    /// Copy the working file into the binary store and version it.
    fn ingest_file(
        &self,
        id: &EntityId,
        path: &Path,
        mime_type: Option<String>,
        user_key: &str,
    ) -> JobResult<()> {
        let file_set = self.load(id)?;
        let content = read_working_file(path)?;
        let name = file_set
            .label
            .clone()
            .or_else(|| path.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_default();

        self.binaries
            .write(id, StoredBinary::new(name, mime_type, content))?;
        let version = self.binaries.create_version(id, &User::new(user_key))?;
        info!(id = %id, version = %version.label, size = version.size, "file ingested");
        Ok(())
    }

    /// Characterize, save, then hand off to derivative generation.
    ///
    /// Expired embargoes and leases are lifted on the same save.
    fn characterize(&self, id: &EntityId, path: &Path) -> JobResult<()> {
        let mut file_set = self.load(id)?;
        self.characterizer.characterize(&mut file_set, path)?;
        VisibilityPropagator.deactivate_expired(&mut file_set, now_utc());
        if !self.repository.save_file_set(&mut file_set)? {
            return Err(JobError::Invalid {
                id: id.clone(),
                errors: file_set.errors,
            });
        }
        info!(id = %id, "file characterized");
        self.queue.enqueue(Job::create_derivatives(id.clone(), path))
    }

    fn create_derivatives(&self, id: &EntityId, path: &Path) -> JobResult<()> {
        let file_set = self.load(id)?;
        self.derivatives.create_derivatives(&file_set, path)?;
        info!(id = %id, "derivatives created");
        Ok(())
    }

    fn load(&self, id: &EntityId) -> JobResult<FileSet> {
        self.repository
            .find_file_set(id)?
            .ok_or_else(|| JobError::FileSetNotFound(id.clone()))
    }
}

impl std::fmt::Debug for JobRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobRunner").finish_non_exhaustive()
    }
}
