//! The [`LockCoordinator`] trait and its RAII [`LockGuard`].

use std::fmt;
use std::time::Duration;

use crate::error::{LockError, Result};

/// Wait policy shared by the lock backends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LockConfig {
    /// Give up after waiting this long.
    pub timeout: Duration,
    /// Base pause between acquisition attempts.
    pub poll_interval: Duration,
    /// Upper bound of the random extra pause added to each poll.
    pub jitter: Duration,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(25),
            jitter: Duration::from_millis(25),
        }
    }
}

/// An acquired lock. Dropping the guard releases it.
pub struct LockGuard {
    key: String,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl LockGuard {
    /// Build a guard that runs `release` exactly once when dropped.
    pub fn new(key: impl Into<String>, release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            key: key.into(),
            release: Some(Box::new(release)),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
            tracing::debug!(key = %self.key, "lock released");
        }
    }
}

impl fmt::Debug for LockGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockGuard").field("key", &self.key).finish()
    }
}

/// Named, exclusive, non-reentrant locks.
///
/// `acquire` blocks until the lock named `key` is free or the backend's
/// timeout elapses. Implementations must be thread-safe and must release
/// the lock when the returned guard is dropped, including during unwinding.
pub trait LockCoordinator: Send + Sync {
    fn acquire(&self, key: &str) -> Result<LockGuard>;
}

/// Scoped helpers over any [`LockCoordinator`], including trait objects.
pub trait LockCoordinatorExt: LockCoordinator {
    /// Run `body` while holding the lock named `key`.
    ///
    /// The lock is released after `body` returns, fails, or panics; `body`'s
    /// error is returned after release.
    fn acquire_and_run<T, E, F>(&self, key: &str, body: F) -> std::result::Result<T, E>
    where
        E: From<LockError>,
        F: FnOnce() -> std::result::Result<T, E>,
    {
        let _guard = self.acquire(key)?;
        body()
    }
}

impl<L: LockCoordinator + ?Sized> LockCoordinatorExt for L {}
