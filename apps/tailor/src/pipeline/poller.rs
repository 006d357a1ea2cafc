//! The recurring status check that runs while a job is generating.
//!
//! One `PollHandle` owns the spawned task. Dropping the handle cancels the loop and
//! aborts the task, so a handle can never outlive the orchestrator that holds it.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::models::{JobId, JobStatus};
use crate::pipeline::orchestrator::Shared;
use crate::pipeline::progress::ProgressEstimate;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// Status checks allowed before the run is failed. `None` polls until a terminal
    /// status arrives.
    pub max_attempts: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: None,
        }
    }
}

pub(crate) struct PollHandle {
    pub(crate) epoch: u64,
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    pub(crate) fn new(epoch: u64, token: CancellationToken, task: JoinHandle<()>) -> Self {
        Self {
            epoch,
            token,
            task: Some(task),
        }
    }

    /// Releases the handle from inside its own task once the loop has finished.
    pub(crate) fn disarm(mut self) {
        self.task.take();
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.token.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

pub(crate) async fn poll_job(shared: Arc<Shared>, job: JobId, token: CancellationToken, epoch: u64) {
    let policy = shared.policy;
    let mut ticker = interval_at(Instant::now() + policy.interval, policy.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut progress = ProgressEstimate::new();
    let mut attempts: u32 = 0;

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                debug!(%job, "poll loop cancelled");
                return;
            }
            _ = ticker.tick() => {}
        }

        attempts += 1;
        let result = tokio::select! {
            biased;
            _ = token.cancelled() => {
                debug!(%job, attempt = attempts, "poll loop cancelled mid-request");
                return;
            }
            result = shared.service.job_status(job) => result,
        };

        match result {
            Ok(mut update) => {
                debug!(%job, attempt = attempts, status = %update.status, "status check");
                if update.id != job {
                    warn!(%job, echoed = %update.id, "status response carried another job id");
                    update.id = job;
                }
                match update.status {
                    JobStatus::Completed => {
                        shared.finish_completed(&token, job, update);
                        break;
                    }
                    JobStatus::Failed => {
                        shared.finish_failed(&token, job, update);
                        break;
                    }
                    JobStatus::Pending | JobStatus::Processing => {
                        if !shared.record_progress(&token, job, update, progress.advance()) {
                            debug!(%job, "run moved on; stopping poll loop");
                            break;
                        }
                    }
                }
            }
            Err(e) => {
                warn!(%job, attempt = attempts, error = %e, "status check failed; retrying on next tick");
            }
        }

        if policy.max_attempts.is_some_and(|max| attempts >= max) {
            shared.finish_exhausted(&token, job, attempts);
            break;
        }
    }

    shared.release_poll(epoch);
}
