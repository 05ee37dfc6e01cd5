use crate::error::JobResult;
use crate::job::Job;

/// Fire-and-forget job submission.
///
/// `enqueue` only hands the job over; it never waits for the job to run.
/// Jobs enqueued by one caller are delivered in enqueue order, and that is
/// the only ordering guarantee.
pub trait JobQueue: Send + Sync {
    fn enqueue(&self, job: Job) -> JobResult<()>;
}
