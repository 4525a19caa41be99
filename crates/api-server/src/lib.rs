//! REST API for video analysis jobs
//!
//! Upload a video, start its analysis, poll the status and download the
//! produced artifacts. Analyses run in the background through the
//! orchestrator's [`JobSupervisor`].

pub mod config;
pub mod error;
pub mod handlers;
pub mod types;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;
use video_analysis_orchestrator::{
    DefaultModelFactory, FfmpegToolkit, InMemoryJobRegistry, JobRegistry, JobSupervisor,
    MediaToolkit, ModelFactory, PipelineConfig, PipelineManager, StorageLayout,
};

pub use config::ServerConfig;
pub use error::{ApiError, ErrorBody};
pub use handlers::*;
pub use types::*;

/// API server state shared across handlers
#[derive(Clone)]
pub struct ApiState {
    pub registry: Arc<dyn JobRegistry>,
    pub supervisor: JobSupervisor,
    pub layout: StorageLayout,
}

impl ApiState {
    /// State over the given model and media backends with a fresh in-memory registry
    #[must_use]
    pub fn with_backends(
        config: &PipelineConfig,
        models: Arc<dyn ModelFactory>,
        media: Arc<dyn MediaToolkit>,
    ) -> Self {
        let registry: Arc<dyn JobRegistry> = Arc::new(InMemoryJobRegistry::new());
        let manager = PipelineManager::new(Arc::clone(&registry), models, media, config);
        Self {
            registry,
            supervisor: JobSupervisor::new(manager, config.max_concurrent_jobs, config.job_timeout),
            layout: config.layout.clone(),
        }
    }

    /// State with the feature-selected model adapters and the ffmpeg tools
    #[must_use]
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::with_backends(
            config,
            Arc::new(DefaultModelFactory::new(config.models.clone())),
            Arc::new(FfmpegToolkit::new()),
        )
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Build the API router with all endpoints
pub fn build_router(state: ApiState, config: &ServerConfig) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/health", get(health_check))
        .route("/api/upload", post(upload_video))
        .route("/api/analyze/{analysis_id}", post(start_analysis))
        .route("/api/status/{analysis_id}", get(get_status))
        .route(
            "/api/download/{analysis_id}/{file_type}",
            get(download_artifact),
        )
        .route("/api/analyses", get(list_analyses))
        .route("/api/analysis/{analysis_id}", delete(delete_analysis))
        // Middleware
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.cors_allowed_origins))
        .with_state(state)
}

/// Start the API server
pub async fn start_server(config: &ServerConfig, state: ApiState) -> Result<(), std::io::Error> {
    tracing::info!("Starting API server on {}", config.addr);

    let app = build_router(state, config);
    let listener = tokio::net::TcpListener::bind(&config.addr).await?;

    axum::serve(listener, app).await
}
