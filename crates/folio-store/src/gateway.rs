use std::sync::Arc;
use std::thread;
use std::time::Duration;

use folio_types::{FileSet, Work};
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::traits::Repository;

/// Bounded retry policy for transient index errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt (total attempts = `max_retries + 1`).
    pub max_retries: u32,
    /// Fixed pause between attempts.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: Duration::from_millis(10),
        }
    }
}

impl RetryPolicy {
    /// No retries: the first transient error is fatal.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff: Duration::ZERO,
        }
    }
}

/// Wraps repository saves with bounded retry on transient backend errors.
///
/// - `Ok(true)`: saved.
/// - `Ok(false)`: validation failed; never retried. Reasons are on the entity.
/// - `Err(StoreError::TransientIndex)`: the retry budget was exhausted.
/// - Any other `Err` propagates immediately.
#[derive(Clone)]
pub struct PersistenceGateway {
    repository: Arc<dyn Repository>,
    policy: RetryPolicy,
}

impl PersistenceGateway {
    pub fn new(repository: Arc<dyn Repository>, policy: RetryPolicy) -> Self {
        Self { repository, policy }
    }

    pub fn repository(&self) -> &Arc<dyn Repository> {
        &self.repository
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn save_file_set(&self, file_set: &mut FileSet) -> StoreResult<bool> {
        let repository = &self.repository;
        self.retrying("file_set", || repository.save_file_set(file_set))
    }

    pub fn save_work(&self, work: &mut Work) -> StoreResult<bool> {
        let repository = &self.repository;
        self.retrying("work", || repository.save_work(work))
    }

    /// Save `file_set` and, only if the save succeeded, run `on_success`.
    ///
    /// `on_success` runs exactly once per successful save and never when
    /// the save fails or the retry budget runs out. Its error propagates.
    pub fn save_file_set_then<E, F>(&self, file_set: &mut FileSet, on_success: F) -> Result<bool, E>
    where
        E: From<StoreError>,
        F: FnOnce(&FileSet) -> Result<(), E>,
    {
        if !self.save_file_set(file_set)? {
            return Ok(false);
        }
        on_success(file_set)?;
        Ok(true)
    }

    /// Run `attempt` until it succeeds, fails non-transiently, or the retry
    /// budget is exhausted.
    pub fn retrying<F>(&self, entity: &str, mut attempt: F) -> StoreResult<bool>
    where
        F: FnMut() -> StoreResult<bool>,
    {
        let mut retries = 0;
        loop {
            match attempt() {
                Ok(saved) => {
                    debug!(entity, saved, retries, "save finished");
                    return Ok(saved);
                }
                Err(err) if err.is_transient() && retries < self.policy.max_retries => {
                    retries += 1;
                    warn!(entity, retries, error = %err, "transient index error during save; retrying");
                    if !self.policy.backoff.is_zero() {
                        thread::sleep(self.policy.backoff);
                    }
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl std::fmt::Debug for PersistenceGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceGateway")
            .field("policy", &self.policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryRepository;
    use std::cell::Cell;

    fn gateway(repo: &Arc<InMemoryRepository>) -> PersistenceGateway {
        PersistenceGateway::new(
            repo.clone(),
            RetryPolicy {
                max_retries: 3,
                backoff: Duration::from_millis(1),
            },
        )
    }

    #[test]
    fn succeeds_on_fourth_attempt_and_runs_hook_once() {
        let repo = Arc::new(InMemoryRepository::new());
        repo.inject_transient_failures(3);
        let hook_calls = Cell::new(0);

        let mut fs = FileSet::new();
        let saved = gateway(&repo)
            .save_file_set_then::<StoreError, _>(&mut fs, |_| {
                hook_calls.set(hook_calls.get() + 1);
                Ok(())
            })
            .unwrap();

        assert!(saved);
        assert_eq!(hook_calls.get(), 1);
        assert_eq!(repo.save_attempts(), 4);
        assert!(fs.id.is_some());
    }

    #[test]
    fn exhausted_budget_propagates_and_skips_hook() {
        let repo = Arc::new(InMemoryRepository::new());
        repo.inject_transient_failures(4);
        let hook_calls = Cell::new(0);

        let mut fs = FileSet::new();
        let err = gateway(&repo)
            .save_file_set_then::<StoreError, _>(&mut fs, |_| {
                hook_calls.set(hook_calls.get() + 1);
                Ok(())
            })
            .unwrap_err();

        assert!(err.is_transient());
        assert_eq!(hook_calls.get(), 0);
        assert_eq!(repo.save_attempts(), 4);
    }

    #[test]
    fn validation_failure_is_not_retried() {
        let repo = Arc::new(InMemoryRepository::new());
        let mut fs = FileSet::new();
        fs.title = vec!["  ".into()];
        let hook_calls = Cell::new(0);

        let saved = gateway(&repo)
            .save_file_set_then::<StoreError, _>(&mut fs, |_| {
                hook_calls.set(hook_calls.get() + 1);
                Ok(())
            })
            .unwrap();

        assert!(!saved);
        assert_eq!(hook_calls.get(), 0);
        assert_eq!(repo.save_attempts(), 1);
    }

    #[test]
    fn non_transient_errors_are_not_retried() {
        let repo = Arc::new(InMemoryRepository::new());
        let attempts = Cell::new(0);
        let err = gateway(&repo)
            .retrying("work", || {
                attempts.set(attempts.get() + 1);
                Err(StoreError::Serialization("bad record".into()))
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
        assert_eq!(attempts.get(), 1);
    }

    #[test]
    fn no_retry_policy_fails_on_first_transient_error() {
        let repo = Arc::new(InMemoryRepository::new());
        repo.inject_transient_failures(1);
        let gw = PersistenceGateway::new(repo.clone(), RetryPolicy::none());
        let mut work = Work::new("Letters");
        assert!(gw.save_work(&mut work).unwrap_err().is_transient());
        assert_eq!(repo.save_attempts(), 1);
    }
}
