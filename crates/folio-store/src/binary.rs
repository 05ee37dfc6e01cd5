use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The current content of a file set's original file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredBinary {
    /// Filename the binary was uploaded under.
    pub original_name: String,
    pub mime_type: Option<String>,
    pub content: Vec<u8>,
    /// Hex-encoded BLAKE3 digest of `content`.
    pub digest: String,
}

impl StoredBinary {
    pub fn new(
        original_name: impl Into<String>,
        mime_type: Option<String>,
        content: Vec<u8>,
    ) -> Self {
        let digest = digest_hex(&content);
        Self {
            original_name: original_name.into(),
            mime_type,
            content,
            digest,
        }
    }

    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }
}

/// One entry in a binary's version history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    /// Version label: `version1`, `version2`, ...
    pub label: String,
    pub created_at: DateTime<Utc>,
    /// User key of whoever created the version.
    pub creator: String,
    pub digest: String,
    pub size: u64,
}

/// Label for the `n`th version (1-based).
pub fn version_label(n: usize) -> String {
    format!("version{n}")
}

/// Hex-encoded BLAKE3 digest.
pub fn digest_hex(data: &[u8]) -> String {
    hex::encode(blake3::hash(data).as_bytes())
}
