//! Error responses

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;
use video_analysis_orchestrator::{JobStatus, RegistryError};

/// JSON body of every error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Message for re-analysis of a job that already left `uploaded`
pub(crate) fn not_fresh(status: JobStatus) -> ApiError {
    let detail = match status {
        JobStatus::Processing => "Analysis already in progress",
        JobStatus::Completed => "Analysis already completed",
        JobStatus::Error => "Analysis already failed",
        JobStatus::Uploaded => "Analysis not started",
    };
    ApiError::BadRequest(detail.to_string())
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound(_) => Self::NotFound("Analysis ID not found".to_string()),
            RegistryError::InvalidTransition { from, .. } => not_fresh(from),
            RegistryError::Terminal { status, .. } => not_fresh(status),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(format!("IO error: {err}"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        (status, Json(ErrorBody { detail: self.to_string() })).into_response()
    }
}
