//! Clinical query HTTP server binary.
//!
//! Loads configuration (see [`clinsynth::AppConfig::load`]), builds the
//! pipeline, and serves until interrupted. Logs go to stderr; set
//! `RUST_LOG` to adjust verbosity.

use std::sync::Arc;

use clinsynth::{AppConfig, ClinicalPipeline, ClinicalServer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("clinsynth-server starting");

    let config = AppConfig::load().map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;
    if config.llm.api_key.is_empty() {
        tracing::warn!("no model API key configured; model requests are sent unauthenticated");
    }

    let pipeline = ClinicalPipeline::from_config(&config)
        .map_err(|e| anyhow::anyhow!("failed to build pipeline: {e}"))?;
    let server = ClinicalServer::start(Arc::new(pipeline), &config.server)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "clinsynth-server failed to start");
            anyhow::anyhow!("clinsynth-server failed: {e}")
        })?;

    tokio::signal::ctrl_c().await?;
    tracing::info!(port = server.port(), "shutting down");
    server.shutdown();

    tracing::info!("clinsynth-server shut down cleanly");
    Ok(())
}
