//! Analysis job orchestration
//!
//! Tracks uploaded videos as jobs and runs the visual, audio and linguistic
//! stages for them in the background:
//!
//! - [`JobRegistry`] owns job records and enforces their lifecycle
//!   (`uploaded → processing → completed | error`).
//! - [`PipelineManager`] runs the stages a job asked for, isolating stage
//!   failures from each other and writing every outcome into the registry.
//! - [`JobSupervisor`] schedules runs as tokio tasks with an optional
//!   concurrency cap and time limit.

pub mod backend;
pub mod config;
pub mod job;
pub mod layout;
pub mod manager;
pub mod registry;
pub mod supervisor;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

use std::path::PathBuf;
use thiserror::Error;

pub use backend::{DefaultModelFactory, FfmpegToolkit, MediaToolkit, ModelFactory};
pub use config::{AllStagesFailedPolicy, ModelSettings, PipelineConfig};
pub use job::{
    new_job_id, ArtifactKind, Job, JobStatus, JobSummary, JobUpdate, NewJob, PipelineMode,
};
pub use layout::StorageLayout;
pub use manager::PipelineManager;
pub use registry::{InMemoryJobRegistry, JobRegistry, RegistryError};
pub use supervisor::{JobOutcome, JobSupervisor, JobTicket};

/// Failures that end a pipeline run as a whole
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Video file not found: {}", .0.display())]
    InputMissing(PathBuf),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
