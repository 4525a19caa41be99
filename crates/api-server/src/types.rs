//! API request and response types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use video_analysis_orchestrator::{Job, JobStatus, JobSummary, PipelineMode};

/// Query of `POST /api/analyze/{id}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyzeQuery {
    pub pipeline_type: Option<String>,
}

/// Query of `GET /api/analyses`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub analysis_id: String,
    pub filename: String,
    pub message: String,
    pub status: JobStatus,
    pub pipeline_type: PipelineMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub analysis_id: String,
    pub status: JobStatus,
    pub message: String,
    pub progress: u8,
    pub pipeline_type: PipelineMode,
}

/// Job status; the completion fields appear only once the job is `completed`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub analysis_id: String,
    pub status: JobStatus,
    pub progress: u8,
    pub filename: String,
    pub pipeline_type: PipelineMode,
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<JobSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_links: Option<BTreeMap<String, String>>,
}

impl StatusResponse {
    #[must_use]
    pub fn from_job(job: &Job) -> Self {
        let completed = job.status == JobStatus::Completed;
        Self {
            analysis_id: job.id.clone(),
            status: job.status,
            progress: job.progress,
            filename: job.original_filename.clone(),
            pipeline_type: job.pipeline_mode,
            error: job.error.clone(),
            processing_time: if completed { job.processing_time() } else { None },
            summary: completed.then(|| job.summary()),
            download_links: completed.then(|| {
                job.artifacts
                    .keys()
                    .map(|kind| {
                        (
                            kind.to_string(),
                            format!("/api/download/{}/{}", job.id, kind),
                        )
                    })
                    .collect()
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisListItem {
    pub analysis_id: String,
    pub status: JobStatus,
    pub filename: String,
    pub progress: u8,
    pub pipeline_type: PipelineMode,
    pub start_time: Option<DateTime<Utc>>,
}

impl From<&Job> for AnalysisListItem {
    fn from(job: &Job) -> Self {
        Self {
            analysis_id: job.id.clone(),
            status: job.status,
            filename: job.original_filename.clone(),
            progress: job.progress,
            pipeline_type: job.pipeline_mode,
            start_time: job.start_time,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisListResponse {
    pub analyses: Vec<AnalysisListItem>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub analysis_id: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub service: String,
    pub version: String,
    pub endpoints: BTreeMap<String, String>,
}
