//! HTTP request handlers for API endpoints

use axum::{
    body::Body,
    extract::{Multipart, Path, Query, Request, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use std::path::{Path as FsPath, PathBuf};
use tokio::io::AsyncWriteExt;
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tracing::{info, warn};
use video_analysis_ingestion::is_supported_container;
use video_analysis_orchestrator::{
    new_job_id, ArtifactKind, JobRegistry, JobStatus, NewJob, PipelineMode, RegistryError,
};

use crate::error::{not_fresh, ApiError};
use crate::types::{
    AnalysisListItem, AnalysisListResponse, AnalyzeQuery, AnalyzeResponse, DeleteResponse,
    HealthResponse, ListQuery, ServiceInfo, StatusResponse, UploadResponse,
};
use crate::ApiState;

const SERVICE_NAME: &str = "Video Analysis API";
const DEFAULT_LIST_LIMIT: usize = 10;

/// Service name, version and endpoint map
pub async fn root() -> impl IntoResponse {
    let endpoints = [
        ("upload", "POST /api/upload"),
        ("analyze", "POST /api/analyze/{analysis_id}"),
        ("status", "GET /api/status/{analysis_id}"),
        ("download", "GET /api/download/{analysis_id}/{file_type}"),
        ("list", "GET /api/analyses"),
        ("delete", "DELETE /api/analysis/{analysis_id}"),
        ("health", "GET /api/health"),
    ]
    .into_iter()
    .map(|(name, route)| (name.to_string(), route.to_string()))
    .collect();

    Json(ServiceInfo {
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints,
    })
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    })
}

/// Accept `video/*` uploads, or a known container extension when the client
/// sent no specific content type.
fn is_video_upload(content_type: Option<&str>, filename: &str) -> bool {
    match content_type {
        Some(ct) if ct.starts_with("video/") => true,
        None | Some("application/octet-stream") => is_supported_container(FsPath::new(filename)),
        Some(_) => false,
    }
}

fn bad_multipart(err: impl std::fmt::Display) -> ApiError {
    ApiError::BadRequest(format!("Invalid upload: {err}"))
}

/// Files written by an upload that has no job yet; removed on drop.
#[derive(Default)]
struct PartialUploads {
    paths: Vec<PathBuf>,
}

impl PartialUploads {
    fn track(&mut self, path: &FsPath) {
        if !self.paths.iter().any(|p| p == path) {
            self.paths.push(path.to_path_buf());
        }
    }

    /// Keep `path` on disk; every other tracked file is removed.
    fn keep(mut self, path: &FsPath) {
        self.paths.retain(|p| p != path);
    }
}

impl Drop for PartialUploads {
    fn drop(&mut self) {
        for path in &self.paths {
            match std::fs::remove_file(path) {
                Ok(()) => info!("Removed unregistered upload {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to remove upload {}: {}", path.display(), e),
            }
        }
    }
}

/// Store an uploaded video and register it as a new job
///
/// Multipart fields: `file` (required) and `pipeline_type` (optional,
/// default `full`).
pub async fn upload_video(
    State(state): State<ApiState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let id = new_job_id();
    let mut stored: Option<(String, PathBuf)> = None;
    let mut mode = PipelineMode::default();
    let mut partial = PartialUploads::default();

    while let Some(mut field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                if !is_video_upload(field.content_type(), &filename) {
                    return Err(ApiError::BadRequest("File must be a video".to_string()));
                }
                let path = state.layout.upload_path(&id, &filename);
                tokio::fs::create_dir_all(state.layout.uploads_dir()).await?;
                partial.track(&path);
                let mut file = tokio::fs::File::create(&path).await?;
                let mut written: u64 = 0;
                while let Some(chunk) = field.chunk().await.map_err(bad_multipart)? {
                    file.write_all(&chunk).await?;
                    written += chunk.len() as u64;
                }
                file.flush().await?;
                info!("Stored upload {} ({} bytes) as {}", filename, written, path.display());
                stored = Some((filename, path));
            }
            Some("pipeline_type") => {
                let text = field.text().await.map_err(bad_multipart)?;
                mode = text.parse().map_err(ApiError::BadRequest)?;
            }
            _ => {}
        }
    }

    let Some((filename, stored_path)) = stored else {
        return Err(ApiError::BadRequest("No file uploaded".to_string()));
    };

    let analysis_id = state
        .registry
        .create(NewJob {
            id,
            original_filename: filename.clone(),
            stored_path: stored_path.clone(),
            pipeline_mode: mode,
        })
        .await?;
    partial.keep(&stored_path);

    Ok(Json(UploadResponse {
        analysis_id,
        filename,
        message: "Video uploaded successfully".to_string(),
        status: JobStatus::Uploaded,
        pipeline_type: mode,
    }))
}

/// Start the analysis of an uploaded video in the background
pub async fn start_analysis(
    State(state): State<ApiState>,
    Path(analysis_id): Path<String>,
    Query(query): Query<AnalyzeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let job = state.registry.get(&analysis_id).await?;
    if job.status != JobStatus::Uploaded {
        return Err(not_fresh(job.status));
    }
    let mode = match query.pipeline_type.as_deref() {
        Some(raw) => raw.parse().map_err(ApiError::BadRequest)?,
        None => job.pipeline_mode,
    };

    let job = state.registry.begin_processing(&analysis_id, mode).await?;
    let ticket = state.supervisor.spawn(&analysis_id, mode);
    info!("Analysis {} scheduled ({})", ticket.job_id(), mode);

    Ok(Json(AnalyzeResponse {
        analysis_id,
        status: job.status,
        message: "Analysis started".to_string(),
        progress: job.progress,
        pipeline_type: mode,
    }))
}

pub async fn get_status(
    State(state): State<ApiState>,
    Path(analysis_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let job = state.registry.get(&analysis_id).await?;
    Ok(Json(StatusResponse::from_job(&job)))
}

/// Header-safe download name
fn attachment_name(stem: &str, kind: ArtifactKind) -> String {
    let stem: String = stem
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{stem}_{}", kind.download_name())
}

/// Stream one artifact of a job
pub async fn download_artifact(
    State(state): State<ApiState>,
    Path((analysis_id, file_type)): Path<(String, String)>,
    request: Request,
) -> Result<Response, ApiError> {
    let job = state.registry.get(&analysis_id).await?;
    let kind: ArtifactKind = file_type
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid file type".to_string()))?;
    let path = job
        .artifacts
        .get(&kind)
        .ok_or_else(|| ApiError::NotFound("File not found".to_string()))?;
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        warn!(
            "Artifact {} of {} is gone from {}",
            kind,
            analysis_id,
            path.display()
        );
        return Err(ApiError::NotFound("File not found on server".to_string()));
    }

    let served = ServeFile::new(path)
        .oneshot(request)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to read {kind}: {e}")))?;
    let mut response = served.map(Body::new);

    let disposition = format!(
        "attachment; filename=\"{}\"",
        attachment_name(&job.original_stem(), kind)
    );
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(kind.media_type()),
    );
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    Ok(response)
}

/// Most recently started analyses first
pub async fn list_analyses(
    State(state): State<ApiState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let jobs = state
        .registry
        .list(query.limit.unwrap_or(DEFAULT_LIST_LIMIT))
        .await?;
    let analyses: Vec<AnalysisListItem> = jobs.iter().map(AnalysisListItem::from).collect();
    Ok(Json(AnalysisListResponse {
        count: analyses.len(),
        analyses,
    }))
}

/// Remove a job with its upload and output files
pub async fn delete_analysis(
    State(state): State<ApiState>,
    Path(analysis_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state.registry.delete(&analysis_id).await;

    let results_dir = state.layout.results_dir(&analysis_id);
    if !matches!(outcome, Err(RegistryError::NotFound(_))) {
        match tokio::fs::remove_dir_all(&results_dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Could not remove {}: {}", results_dir.display(), e),
        }
    }

    outcome?;
    info!("Analysis {} deleted", analysis_id);
    Ok(Json(DeleteResponse {
        analysis_id,
        message: "Analysis deleted successfully".to_string(),
    }))
}
