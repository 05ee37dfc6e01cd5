//! Cross-process lock coordinator backed by `flock`.
//!
//! Each key maps to one lock file under the lock directory. A lock is held
//! while an exclusive `flock(LOCK_EX | LOCK_NB)` on that file is held; the
//! kernel drops it when the file is closed, including when the holding
//! process dies. Threads of the same process are serialized first through an
//! [`InMemoryLockManager`] so that only one of them polls the file at a time.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::{LockError, Result};
use crate::memory::InMemoryLockManager;
use crate::names::{lock_file_name, validate_lock_key};
use crate::traits::{LockConfig, LockCoordinator, LockGuard};

/// Named locks shared by every process that uses the same lock directory.
#[derive(Debug)]
pub struct FileLockManager {
    dir: PathBuf,
    local: InMemoryLockManager,
    config: LockConfig,
}

impl FileLockManager {
    /// Create a manager rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>, config: LockConfig) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            local: InMemoryLockManager::new(config.clone()),
            config,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the lock file for `key`.
    pub fn lock_path(&self, key: &str) -> PathBuf {
        self.dir.join(lock_file_name(key))
    }

    fn open_lock_file(&self, key: &str) -> Result<File> {
        let path = self.lock_path(key);
        OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(LockError::from)
    }

    fn pause(&self) {
        let jitter_ms = self.config.jitter.as_millis() as u64;
        let extra = if jitter_ms == 0 {
            0
        } else {
            rand::random::<u64>() % (jitter_ms + 1)
        };
        thread::sleep(self.config.poll_interval + Duration::from_millis(extra));
    }
}

impl LockCoordinator for FileLockManager {
    fn acquire(&self, key: &str) -> Result<LockGuard> {
        validate_lock_key(key)?;
        let start = Instant::now();
        let local = self.local.acquire(key)?;
        let file = self.open_lock_file(key)?;

        loop {
            match try_flock_exclusive(&file) {
                Ok(true) => break,
                Ok(false) => {
                    if start.elapsed() >= self.config.timeout {
                        return Err(LockError::Timeout {
                            key: key.to_string(),
                            waited: start.elapsed(),
                        });
                    }
                    self.pause();
                }
                Err(source) => {
                    return Err(LockError::LockFailed {
                        key: key.to_string(),
                        source,
                    });
                }
            }
        }
        debug!(key, path = %self.lock_path(key).display(), "file lock acquired");

        Ok(LockGuard::new(key, move || {
            // Closing the descriptor releases the flock; then let the next
            // local thread in.
            drop(file);
            drop(local);
        }))
    }
}

/// Try to acquire an exclusive flock on a file (non-blocking).
///
/// Returns `Ok(true)` if the lock was acquired, `Ok(false)` if the file is
/// already locked through another open file description.
fn try_flock_exclusive(file: &File) -> io::Result<bool> {
    #[cfg(unix)]
    {
        use std::os::unix::io::AsRawFd;
        let fd = file.as_raw_fd();
        // SAFETY: fd is a valid descriptor owned by `file` for the duration
        // of the call.
        let result = unsafe { libc::flock(fd, libc::LOCK_EX | libc::LOCK_NB) };
        if result == 0 {
            return Ok(true);
        }
        let err = io::Error::last_os_error();
        if err.kind() == io::ErrorKind::WouldBlock || err.raw_os_error() == Some(libc::EWOULDBLOCK)
        {
            return Ok(false);
        }
        Err(err)
    }
    #[cfg(not(unix))]
    {
        let _ = file;
        Ok(true)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::traits::LockCoordinatorExt;

    fn quick_config() -> LockConfig {
        LockConfig {
            timeout: Duration::from_millis(80),
            poll_interval: Duration::from_millis(5),
            jitter: Duration::from_millis(2),
        }
    }

    #[test]
    fn creates_lock_directory_and_file() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("locks");
        let locks = FileLockManager::new(&dir, quick_config()).unwrap();
        let _guard = locks.acquire("abc123").unwrap();
        assert!(dir.join("abc123.lock").exists());
    }

    #[test]
    fn independent_managers_exclude_each_other() {
        // Two managers share no in-process state, like two processes would.
        let tmp = tempfile::tempdir().unwrap();
        let first = FileLockManager::new(tmp.path(), quick_config()).unwrap();
        let second = FileLockManager::new(tmp.path(), quick_config()).unwrap();

        let guard = first.acquire("w1").unwrap();
        assert!(matches!(
            second.acquire("w1"),
            Err(LockError::Timeout { .. })
        ));

        drop(guard);
        assert!(second.acquire("w1").is_ok());
    }

    #[test]
    fn released_after_body_error() {
        let tmp = tempfile::tempdir().unwrap();
        let first = FileLockManager::new(tmp.path(), quick_config()).unwrap();
        let second = FileLockManager::new(tmp.path(), quick_config()).unwrap();

        let result: Result<()> = first.acquire_and_run("w1", || {
            Err(LockError::Io(io::Error::other("body failed")))
        });
        assert!(result.is_err());
        assert!(second.acquire("w1").is_ok());
    }

    #[test]
    fn same_thread_reacquire_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let locks = FileLockManager::new(tmp.path(), quick_config()).unwrap();
        let _guard = locks.acquire("w1").unwrap();
        assert!(matches!(
            locks.acquire("w1"),
            Err(LockError::Reentrant { .. })
        ));
    }
}
