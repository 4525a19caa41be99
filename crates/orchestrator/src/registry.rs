//! Job registry: the single owner of job records

use crate::job::{Job, JobStatus, JobUpdate, NewJob, PipelineMode};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::Path;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Registry failures
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Analysis ID not found: {0}")]
    NotFound(String),

    #[error("Analysis ID already registered: {0}")]
    AlreadyExists(String),

    #[error("Job {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: String,
        from: JobStatus,
        to: JobStatus,
    },

    #[error("Job {id} is {status} and can no longer change")]
    Terminal { id: String, status: JobStatus },

    #[error("Job {id} removed but {} file(s) could not be deleted: {}", .failures.len(), .failures.join("; "))]
    Cleanup { id: String, failures: Vec<String> },
}

pub type Result<T> = std::result::Result<T, RegistryError>;

/// Storage of job records shared by request handlers and background tasks
#[async_trait]
pub trait JobRegistry: Send + Sync {
    /// Register an uploaded file; returns the job id.
    async fn create(&self, job: NewJob) -> Result<String>;

    async fn get(&self, id: &str) -> Result<Job>;

    /// Merge `update` into the job and return the new record.
    ///
    /// Only `processing → completed | error` status changes are accepted,
    /// terminal jobs reject every update, and progress never decreases while
    /// processing (it stays below 100 until completion).
    async fn update(&self, id: &str, update: JobUpdate) -> Result<Job>;

    /// Move an uploaded job to processing with `mode`; fails for any other state.
    async fn begin_processing(&self, id: &str, mode: PipelineMode) -> Result<Job>;

    /// Up to `limit` jobs, most recently started first, never-started last.
    async fn list(&self, limit: usize) -> Result<Vec<Job>>;

    /// Remove the job, then unlink its upload and artifacts.
    ///
    /// Files already gone are ignored. Other unlink failures are reported as
    /// [`RegistryError::Cleanup`] after the record has been removed.
    async fn delete(&self, id: &str) -> Result<Job>;
}

/// Process-local registry behind a `tokio` read/write lock
#[derive(Debug, Default)]
pub struct InMemoryJobRegistry {
    jobs: RwLock<HashMap<String, Job>>,
}

impl InMemoryJobRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }
}

fn apply_update(job: &mut Job, update: JobUpdate) -> Result<()> {
    if job.status.is_terminal() {
        return Err(RegistryError::Terminal {
            id: job.id.clone(),
            status: job.status,
        });
    }

    let next_status = match update.status {
        Some(to) if to == job.status => None,
        Some(to @ (JobStatus::Completed | JobStatus::Error))
            if job.status == JobStatus::Processing =>
        {
            Some(to)
        }
        Some(to) => {
            return Err(RegistryError::InvalidTransition {
                id: job.id.clone(),
                from: job.status,
                to,
            })
        }
        None => None,
    };

    match next_status {
        Some(JobStatus::Completed) => job.progress = 100,
        Some(JobStatus::Error) => job.progress = update.progress.unwrap_or(0).min(99),
        _ => {
            if let Some(progress) = update.progress {
                job.progress = job.progress.max(progress.min(99));
            }
        }
    }

    if !update.results.is_empty() {
        job.results
            .get_or_insert_with(Default::default)
            .extend(update.results);
    }
    job.artifacts.extend(update.artifacts);
    if update.error.is_some() {
        job.error = update.error;
    }
    if let Some(status) = next_status {
        job.status = status;
        job.end_time = Some(Utc::now());
    }
    Ok(())
}

async fn remove_file(path: &Path, failures: &mut Vec<String>) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!("Removed {}", path.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => {
            warn!("Failed to remove {}: {}", path.display(), e);
            failures.push(format!("{}: {e}", path.display()));
        }
    }
}

#[async_trait]
impl JobRegistry for InMemoryJobRegistry {
    async fn create(&self, new: NewJob) -> Result<String> {
        let mut jobs = self.jobs.write().await;
        if jobs.contains_key(&new.id) {
            return Err(RegistryError::AlreadyExists(new.id));
        }
        let job = Job::new(new);
        let id = job.id.clone();
        info!(
            "Registered job {} for {} ({})",
            id, job.original_filename, job.pipeline_mode
        );
        jobs.insert(id.clone(), job);
        Ok(id)
    }

    async fn get(&self, id: &str) -> Result<Job> {
        self.jobs
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }

    async fn update(&self, id: &str, update: JobUpdate) -> Result<Job> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;
        apply_update(job, update)?;
        Ok(job.clone())
    }

    async fn begin_processing(&self, id: &str, mode: PipelineMode) -> Result<Job> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;
        if job.status != JobStatus::Uploaded {
            return Err(RegistryError::InvalidTransition {
                id: id.to_string(),
                from: job.status,
                to: JobStatus::Processing,
            });
        }
        job.status = JobStatus::Processing;
        job.progress = 10;
        job.pipeline_mode = mode;
        job.start_time = Some(Utc::now());
        Ok(job.clone())
    }

    async fn list(&self, limit: usize) -> Result<Vec<Job>> {
        let mut jobs: Vec<Job> = self.jobs.read().await.values().cloned().collect();
        jobs.sort_by(|a, b| {
            // Some > None, so descending order puts unstarted jobs last
            b.start_time
                .cmp(&a.start_time)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        jobs.truncate(limit);
        Ok(jobs)
    }

    async fn delete(&self, id: &str) -> Result<Job> {
        let job = self
            .jobs
            .write()
            .await
            .remove(id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;

        let mut failures = Vec::new();
        remove_file(&job.file_path, &mut failures).await;
        for path in job.artifacts.values() {
            remove_file(path, &mut failures).await;
        }

        if failures.is_empty() {
            info!("Deleted job {}", id);
            Ok(job)
        } else {
            Err(RegistryError::Cleanup {
                id: id.to_string(),
                failures,
            })
        }
    }
}
