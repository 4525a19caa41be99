//! Background execution of pipeline runs
//!
//! Each analysis runs as its own tokio task. The supervisor bounds how many
//! run at once, applies the optional time limit, and turns panics and
//! timeouts into an `error` job state so no job stays `processing` forever.

use crate::job::{JobStatus, JobUpdate, PipelineMode};
use crate::manager::PipelineManager;
use crate::registry::JobRegistry;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

/// How a supervised run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// The pipeline returned; carries the job's status afterwards
    Finished(JobStatus),
    TimedOut,
    Panicked(String),
}

/// Handle to one scheduled run
#[derive(Debug)]
pub struct JobTicket {
    job_id: String,
    handle: JoinHandle<JobOutcome>,
}

impl JobTicket {
    #[must_use]
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Wait for the run to end.
    pub async fn wait(self) -> JobOutcome {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(err) => JobOutcome::Panicked(err.to_string()),
        }
    }
}

fn panic_message(err: tokio::task::JoinError) -> String {
    match err.try_into_panic() {
        Ok(payload) => payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string()),
        Err(err) => err.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct JobSupervisor {
    manager: PipelineManager,
    permits: Option<Arc<Semaphore>>,
    timeout: Option<Duration>,
}

impl JobSupervisor {
    /// `max_concurrent` of 0 lets every job run immediately.
    #[must_use]
    pub fn new(manager: PipelineManager, max_concurrent: usize, timeout: Option<Duration>) -> Self {
        Self {
            manager,
            permits: (max_concurrent > 0).then(|| Arc::new(Semaphore::new(max_concurrent))),
            timeout,
        }
    }

    #[must_use]
    pub fn manager(&self) -> &PipelineManager {
        &self.manager
    }

    /// Schedule the pipeline for a job that is already `processing`.
    ///
    /// Returns at once; the run waits for a free slot when the cap is reached.
    pub fn spawn(&self, job_id: &str, mode: PipelineMode) -> JobTicket {
        let manager = self.manager.clone();
        let permits = self.permits.clone();
        let timeout = self.timeout;
        let id = job_id.to_string();

        let handle = tokio::spawn(async move {
            let _permit = match permits {
                Some(semaphore) => match semaphore.acquire_owned().await {
                    Ok(permit) => Some(permit),
                    Err(err) => {
                        warn!("Concurrency limiter closed: {}", err);
                        None
                    }
                },
                None => None,
            };
            debug!("Analysis {} acquired a run slot", id);

            let run = {
                let manager = manager.clone();
                let id = id.clone();
                tokio::spawn(async move { manager.execute(&id, mode).await })
            };
            supervise(&manager, &id, run, timeout).await
        });

        JobTicket {
            job_id: job_id.to_string(),
            handle,
        }
    }

    /// Wait for a ticket returned by [`JobSupervisor::spawn`].
    pub async fn wait(&self, ticket: JobTicket) -> JobOutcome {
        ticket.wait().await
    }
}

async fn supervise(
    manager: &PipelineManager,
    job_id: &str,
    mut run: JoinHandle<()>,
    timeout: Option<Duration>,
) -> JobOutcome {
    let joined = match timeout {
        Some(limit) => match tokio::time::timeout(limit, &mut run).await {
            Ok(joined) => joined,
            Err(_) => {
                run.abort();
                error!("Analysis {} timed out after {:?}", job_id, limit);
                mark_failed(
                    manager,
                    job_id,
                    format!("analysis timed out after {}s", limit.as_secs()),
                )
                .await;
                return JobOutcome::TimedOut;
            }
        },
        None => run.await,
    };

    match joined {
        Ok(()) => match manager.registry().get(job_id).await {
            Ok(job) => JobOutcome::Finished(job.status),
            // deleted while running
            Err(_) => JobOutcome::Finished(JobStatus::Error),
        },
        Err(err) => {
            let message = panic_message(err);
            error!("Analysis {} panicked: {}", job_id, message);
            mark_failed(manager, job_id, format!("analysis crashed: {message}")).await;
            JobOutcome::Panicked(message)
        }
    }
}

async fn mark_failed(manager: &PipelineManager, job_id: &str, message: String) {
    if let Err(err) = manager
        .registry()
        .update(job_id, JobUpdate::failed(message))
        .await
    {
        warn!("Could not record failure of {}: {}", job_id, err);
    }
}
