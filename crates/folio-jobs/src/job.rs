use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use folio_types::{now_utc, EntityId, User};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kinds of asynchronous work the orchestrator dispatches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobKind {
    /// Copy a staged working file into preservation storage.
    IngestFile,
    /// Extract technical metadata from a staged working file.
    Characterize,
    /// Generate derivative artifacts from a characterized file.
    CreateDerivatives,
}

impl JobKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::IngestFile => "ingest_file",
            Self::Characterize => "characterize",
            Self::CreateDerivatives => "create_derivatives",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind-specific job arguments.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobPayload {
    IngestFile {
        working_path: PathBuf,
        mime_type: Option<String>,
        user_key: String,
    },
    Characterize {
        working_path: PathBuf,
    },
    CreateDerivatives {
        working_path: PathBuf,
    },
}

/// An immutable instruction addressed to one file set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub entity_id: EntityId,
    pub payload: JobPayload,
    pub enqueued_at: DateTime<Utc>,
}

impl Job {
    fn new(entity_id: EntityId, payload: JobPayload) -> Self {
        Self {
            id: Uuid::now_v7(),
            entity_id,
            payload,
            enqueued_at: now_utc(),
        }
    }

    pub fn ingest_file(
        entity_id: EntityId,
        working_path: impl Into<PathBuf>,
        mime_type: Option<String>,
        user: &User,
    ) -> Self {
        Self::new(
            entity_id,
            JobPayload::IngestFile {
                working_path: working_path.into(),
                mime_type,
                user_key: user.user_key().to_string(),
            },
        )
    }

    pub fn characterize(entity_id: EntityId, working_path: impl Into<PathBuf>) -> Self {
        Self::new(
            entity_id,
            JobPayload::Characterize {
                working_path: working_path.into(),
            },
        )
    }

    pub fn create_derivatives(entity_id: EntityId, working_path: impl Into<PathBuf>) -> Self {
        Self::new(
            entity_id,
            JobPayload::CreateDerivatives {
                working_path: working_path.into(),
            },
        )
    }

    pub fn kind(&self) -> JobKind {
        match self.payload {
            JobPayload::IngestFile { .. } => JobKind::IngestFile,
            JobPayload::Characterize { .. } => JobKind::Characterize,
            JobPayload::CreateDerivatives { .. } => JobKind::CreateDerivatives,
        }
    }

    /// The staged file every job kind operates on.
    pub fn working_path(&self) -> &Path {
        match &self.payload {
            JobPayload::IngestFile { working_path, .. }
            | JobPayload::Characterize { working_path }
            | JobPayload::CreateDerivatives { working_path } => working_path,
        }
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.kind(),
            self.entity_id,
            self.working_path().display()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fs_id() -> EntityId {
        EntityId::new("abcd1234").unwrap()
    }

    #[test]
    fn constructors_set_kind() {
        let user = User::new("jill@example.com");
        let ingest = Job::ingest_file(fs_id(), "/w/ab/photo.jpg", Some("image/jpeg".into()), &user);
        assert_eq!(ingest.kind(), JobKind::IngestFile);
        assert_eq!(ingest.working_path(), Path::new("/w/ab/photo.jpg"));
        match &ingest.payload {
            JobPayload::IngestFile { user_key, mime_type, .. } => {
                assert_eq!(user_key, "jill@example.com");
                assert_eq!(mime_type.as_deref(), Some("image/jpeg"));
            }
            other => panic!("unexpected payload {other:?}"),
        }

        assert_eq!(Job::characterize(fs_id(), "/w").kind(), JobKind::Characterize);
        assert_eq!(
            Job::create_derivatives(fs_id(), "/w").kind(),
            JobKind::CreateDerivatives
        );
    }

    #[test]
    fn jobs_get_distinct_ids() {
        let a = Job::characterize(fs_id(), "/w");
        let b = Job::characterize(fs_id(), "/w");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn display_names_kind_and_entity() {
        let job = Job::characterize(fs_id(), "/w/a.txt");
        assert_eq!(job.to_string(), "characterize abcd1234 /w/a.txt");
    }
}
