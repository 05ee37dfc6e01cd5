//! In-process lock coordinator.
//!
//! [`InMemoryLockManager`] keeps the set of held keys in a `HashMap` behind a
//! `Mutex`, with a `Condvar` to wake waiters on release. It serializes
//! threads of one process only; use [`crate::FileLockManager`] when several
//! processes share the same repository.

use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};
use std::time::Instant;

use tracing::debug;

use crate::error::{LockError, Result};
use crate::names::validate_lock_key;
use crate::traits::{LockConfig, LockCoordinator, LockGuard};

#[derive(Default)]
struct LockTable {
    held: Mutex<HashMap<String, ThreadId>>,
    released: Condvar,
}

impl LockTable {
    fn held(&self) -> MutexGuard<'_, HashMap<String, ThreadId>> {
        // The table stays consistent even if a holder panicked.
        self.held.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Named locks shared by the threads of one process.
#[derive(Clone)]
pub struct InMemoryLockManager {
    table: Arc<LockTable>,
    config: LockConfig,
}

impl InMemoryLockManager {
    pub fn new(config: LockConfig) -> Self {
        Self {
            table: Arc::new(LockTable::default()),
            config,
        }
    }

    pub fn config(&self) -> &LockConfig {
        &self.config
    }

    /// Whether any thread currently holds `key`.
    pub fn is_held(&self, key: &str) -> bool {
        self.table.held().contains_key(key)
    }
}

impl Default for InMemoryLockManager {
    fn default() -> Self {
        Self::new(LockConfig::default())
    }
}

impl LockCoordinator for InMemoryLockManager {
    fn acquire(&self, key: &str) -> Result<LockGuard> {
        validate_lock_key(key)?;
        let me = thread::current().id();
        let start = Instant::now();
        let deadline = start + self.config.timeout;

        let mut held = self.table.held();
        loop {
            match held.get(key).copied() {
                None => break,
                Some(owner) if owner == me => {
                    return Err(LockError::Reentrant {
                        key: key.to_string(),
                    });
                }
                Some(_) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(LockError::Timeout {
                            key: key.to_string(),
                            waited: start.elapsed(),
                        });
                    }
                    held = self
                        .table
                        .released
                        .wait_timeout(held, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0;
                }
            }
        }
        held.insert(key.to_string(), me);
        drop(held);
        debug!(key, waited_ms = start.elapsed().as_millis() as u64, "lock acquired");

        let table = Arc::clone(&self.table);
        let owned_key = key.to_string();
        Ok(LockGuard::new(key, move || {
            table.held().remove(&owned_key);
            table.released.notify_all();
        }))
    }
}

impl std::fmt::Debug for InMemoryLockManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryLockManager")
            .field("held", &self.table.held().len())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::LockCoordinatorExt;
    use std::sync::Barrier;
    use std::time::Duration;

    fn quick_config() -> LockConfig {
        LockConfig {
            timeout: Duration::from_millis(100),
            poll_interval: Duration::from_millis(1),
            jitter: Duration::from_millis(1),
        }
    }

    #[test]
    fn guard_drop_releases() {
        let locks = InMemoryLockManager::default();
        let guard = locks.acquire("w1").unwrap();
        assert!(locks.is_held("w1"));
        assert_eq!(guard.key(), "w1");
        drop(guard);
        assert!(!locks.is_held("w1"));
    }

    #[test]
    fn distinct_keys_do_not_contend() {
        let locks = InMemoryLockManager::default();
        let _a = locks.acquire("w1").unwrap();
        let _b = locks.acquire("w2").unwrap();
        assert!(locks.is_held("w1") && locks.is_held("w2"));
    }

    #[test]
    fn nested_acquire_is_rejected() {
        let locks = InMemoryLockManager::default();
        let _guard = locks.acquire("w1").unwrap();
        assert!(matches!(
            locks.acquire("w1"),
            Err(LockError::Reentrant { .. })
        ));
    }

    #[test]
    fn contended_acquire_times_out() {
        let locks = InMemoryLockManager::new(quick_config());
        let _guard = locks.acquire("w1").unwrap();
        let other = locks.clone();
        let result = thread::spawn(move || other.acquire("w1").map(|_| ()))
            .join()
            .unwrap();
        assert!(matches!(result, Err(LockError::Timeout { .. })));
    }

    #[test]
    fn body_error_releases_lock() {
        let locks = InMemoryLockManager::default();
        let result: std::result::Result<(), LockError> = locks.acquire_and_run("w1", || {
            Err(LockError::InvalidKey {
                key: "w1".into(),
                reason: "body failed".into(),
            })
        });
        assert!(result.is_err());
        assert!(!locks.is_held("w1"));
    }

    #[test]
    fn panicking_body_releases_lock() {
        let locks = InMemoryLockManager::default();
        let inner = locks.clone();
        let outcome = thread::spawn(move || {
            let _: std::result::Result<(), LockError> =
                inner.acquire_and_run("w1", || panic!("boom"));
        })
        .join();
        assert!(outcome.is_err());
        assert!(!locks.is_held("w1"));
    }

    #[test]
    fn serializes_read_modify_write() {
        const THREADS: usize = 8;
        let locks = InMemoryLockManager::default();
        let shared = Arc::new(Mutex::new(Vec::new()));
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|i| {
                let locks = locks.clone();
                let shared = Arc::clone(&shared);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    locks
                        .acquire_and_run::<_, LockError, _>("list", || {
                            let mut snapshot = shared.lock().unwrap().clone();
                            thread::sleep(Duration::from_millis(2));
                            snapshot.push(i);
                            *shared.lock().unwrap() = snapshot;
                            Ok(())
                        })
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let mut result = shared.lock().unwrap().clone();
        result.sort_unstable();
        assert_eq!(result, (0..THREADS).collect::<Vec<_>>());
    }
}
