use tokio::sync::mpsc;
use tracing::debug;

use crate::error::{JobError, JobResult};
use crate::job::Job;
use crate::traits::JobQueue;

/// Receiving half handed to whatever consumes a [`ChannelJobQueue`].
pub type JobReceiver = mpsc::UnboundedReceiver<Job>;

/// Hands jobs to an in-process async consumer.
///
/// The channel is unbounded so `enqueue` never blocks the synchronous
/// orchestrator. Once the receiver is dropped, enqueue fails with
/// [`JobError::QueueClosed`].
#[derive(Clone, Debug)]
pub struct ChannelJobQueue {
    sender: mpsc::UnboundedSender<Job>,
}

impl ChannelJobQueue {
    pub fn new() -> (Self, JobReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl JobQueue for ChannelJobQueue {
    fn enqueue(&self, job: Job) -> JobResult<()> {
        debug!(kind = %job.kind(), entity = %job.entity_id, "job sent");
        self.sender.send(job).map_err(|_| JobError::QueueClosed)
    }
}
