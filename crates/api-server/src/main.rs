//! API Server Binary Entry Point

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use video_analysis_api_server::{start_server, ApiState, ServerConfig};
use video_analysis_orchestrator::PipelineConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "video_analysis_api_server=info,video_analysis_orchestrator=info,tower_http=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let server = ServerConfig::from_env();
    let pipeline = PipelineConfig::from_env();
    pipeline.layout.ensure()?;
    tracing::info!(
        "Data directory {}, at most {} concurrent analyses",
        pipeline.layout.root().display(),
        pipeline.max_concurrent_jobs
    );

    let state = ApiState::from_config(&pipeline);

    tracing::info!("Starting Video Analysis API Server");
    start_server(&server, state).await?;

    Ok(())
}
