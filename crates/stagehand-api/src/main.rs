//! Stagehand API server entry point.

use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

use stagehand_api::config::ServerConfig;
use stagehand_api::project_store::{FileProjectRepository, load_checked_project};
use stagehand_api::state::AppState;
use stagehand_core::clock::SystemClock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Stagehand API server");

    let config = ServerConfig::from_env()?;

    // Load and check the project.
    let repository = FileProjectRepository::new(&config.project_path);
    let (project, _report) = load_checked_project(&repository).await?;

    let app_state = AppState::new(
        project,
        Arc::new(SystemClock),
        config.settings,
        &config.asset_base_url,
    );

    // Build router.
    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let app = stagehand_api::app(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server.
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| format!("invalid HOST:PORT combination: {e}"))?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
