use std::sync::Mutex;

use tracing::debug;

use crate::error::JobResult;
use crate::job::{Job, JobKind};
use crate::traits::JobQueue;

/// Records enqueued jobs in memory.
///
/// Used by tests to observe dispatch, and by embedders that drain jobs
/// themselves.
#[derive(Debug, Default)]
pub struct InMemoryJobQueue {
    jobs: Mutex<Vec<Job>>,
}

impl InMemoryJobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all jobs enqueued so far, in order.
    pub fn jobs(&self) -> Vec<Job> {
        self.jobs.lock().expect("lock poisoned").clone()
    }

    pub fn kinds(&self) -> Vec<JobKind> {
        self.jobs
            .lock()
            .expect("lock poisoned")
            .iter()
            .map(Job::kind)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.jobs.lock().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove and return every pending job.
    pub fn drain(&self) -> Vec<Job> {
        std::mem::take(&mut *self.jobs.lock().expect("lock poisoned"))
    }
}

impl JobQueue for InMemoryJobQueue {
    fn enqueue(&self, job: Job) -> JobResult<()> {
        debug!(kind = %job.kind(), entity = %job.entity_id, "job enqueued");
        self.jobs.lock().expect("lock poisoned").push(job);
        Ok(())
    }
}
