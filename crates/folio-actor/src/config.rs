use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use folio_lock::LockConfig;
use folio_store::RetryPolicy;
use serde::{Deserialize, Serialize};

use crate::error::{ActorError, ActorResult};

/// Orchestrator configuration, loaded from TOML.
///
/// ```toml
/// working_path = "/var/folio/working"
///
/// [lock]
/// dir = "/var/folio/locks"
/// timeout = 30000
///
/// [retry]
/// max_retries = 3
/// backoff = 10
/// ```
///
/// Durations are milliseconds. Every key is optional.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FolioConfig {
    /// Root of the working directory that uploads are staged under.
    pub working_path: PathBuf,
    pub lock: LockSettings,
    pub retry: RetrySettings,
    pub jobs: JobSettings,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockSettings {
    /// Directory holding one lock file per locked key.
    pub dir: PathBuf,
    #[serde(with = "duration_millis")]
    pub timeout: Duration,
    #[serde(with = "duration_millis")]
    pub poll_interval: Duration,
    #[serde(with = "duration_millis")]
    pub jitter: Duration,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_retries: u32,
    #[serde(with = "duration_millis")]
    pub backoff: Duration,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobSettings {
    /// Durable job spool. Jobs stay in memory when unset.
    pub spool_path: Option<PathBuf>,
}

impl Default for FolioConfig {
    fn default() -> Self {
        Self {
            working_path: PathBuf::from("tmp/uploads"),
            lock: LockSettings::default(),
            retry: RetrySettings::default(),
            jobs: JobSettings::default(),
        }
    }
}

impl Default for LockSettings {
    fn default() -> Self {
        let defaults = LockConfig::default();
        Self {
            dir: PathBuf::from("tmp/locks"),
            timeout: defaults.timeout,
            poll_interval: defaults.poll_interval,
            jitter: defaults.jitter,
        }
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        let defaults = RetryPolicy::default();
        Self {
            max_retries: defaults.max_retries,
            backoff: defaults.backoff,
        }
    }
}

impl FolioConfig {
    pub fn load(path: impl AsRef<Path>) -> ActorResult<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|e| ActorError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> ActorResult<Self> {
        toml::from_str(raw).map_err(|e| ActorError::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> ActorResult<String> {
        toml::to_string_pretty(self).map_err(|e| ActorError::Config(e.to_string()))
    }

    pub fn lock_config(&self) -> LockConfig {
        LockConfig {
            timeout: self.lock.timeout,
            poll_interval: self.lock.poll_interval,
            jitter: self.lock.jitter,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.retry.max_retries,
            backoff: self.retry.backoff,
        }
    }
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = FolioConfig::from_toml_str("").unwrap();
        assert_eq!(config, FolioConfig::default());
        assert_eq!(config.retry_policy(), RetryPolicy::default());
        assert_eq!(config.lock_config(), LockConfig::default());
    }

    #[test]
    fn partial_document_overrides_named_keys() {
        let config = FolioConfig::from_toml_str(
            r#"
            working_path = "/srv/working"

            [lock]
            timeout = 500

            [retry]
            max_retries = 1
            backoff = 0

            [jobs]
            spool_path = "/srv/jobs.log"
            "#,
        )
        .unwrap();

        assert_eq!(config.working_path, PathBuf::from("/srv/working"));
        assert_eq!(config.lock.timeout, Duration::from_millis(500));
        assert_eq!(config.lock.dir, PathBuf::from("tmp/locks"));
        assert_eq!(
            config.retry_policy(),
            RetryPolicy {
                max_retries: 1,
                backoff: Duration::ZERO,
            }
        );
        assert_eq!(config.jobs.spool_path, Some(PathBuf::from("/srv/jobs.log")));
    }

    #[test]
    fn round_trips_through_toml() {
        let mut config = FolioConfig::default();
        config.retry.backoff = Duration::from_millis(250);
        let text = config.to_toml_string().unwrap();
        assert!(text.contains("backoff = 250"));
        assert_eq!(FolioConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn malformed_document_is_a_config_error() {
        let err = FolioConfig::from_toml_str("working_path = 12").unwrap_err();
        assert!(matches!(err, ActorError::Config(_)));
    }

    #[test]
    fn load_reads_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("folio.toml");
        fs::write(&path, "working_path = \"/w\"\n").unwrap();
        assert_eq!(FolioConfig::load(&path).unwrap().working_path, PathBuf::from("/w"));
        assert!(FolioConfig::load(tmp.path().join("missing.toml")).is_err());
    }
}
