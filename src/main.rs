// Main entry point - Dependency injection and server setup
use std::{net::SocketAddr, sync::Arc};
use tracing_subscriber::EnvFilter;

use greenhouse_telemetry::application::dashboard_service::DashboardService;
use greenhouse_telemetry::application::streaming_service::StreamingZoneService;
use greenhouse_telemetry::application::zone_service::ZoneService;
use greenhouse_telemetry::infrastructure::config::load_config;
use greenhouse_telemetry::infrastructure::greenhouse_api::{ApiSession, GreenhouseApiClient};
use greenhouse_telemetry::presentation::app_state::AppState;
use greenhouse_telemetry::presentation::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("greenhouse_telemetry=info,tower_http=info")),
        )
        .init();

    // Load configuration
    let config = load_config()?;
    if config.api.api_key.is_empty() {
        tracing::warn!("No API key configured; set GREENHOUSE__API__API_KEY");
    }

    // Create repository (infrastructure layer)
    let session = ApiSession::new(config.api.base_url.clone(), config.api.api_key.clone());
    let repository = Arc::new(GreenhouseApiClient::new(session, &config.api)?);

    // Create services (application layer)
    let policy = config.ranges.clone();
    let zone_service = ZoneService::new(repository.clone(), policy.clone());
    let dashboard_service = DashboardService::new(repository.clone(), policy.clone());
    let streaming_service = StreamingZoneService::new(repository, policy, config.monitor.poll_interval());

    // Create application state
    let state = Arc::new(AppState {
        zone_service,
        dashboard_service,
        streaming_service,
        default_hours: config.monitor.history_hours,
    });

    // Build router (presentation layer)
    let router = build_router(state);

    // Start server
    let addr: SocketAddr = config.server.bind_addr.parse()?;
    tracing::info!(
        "Starting greenhouse-telemetry service on {} (upstream {})",
        addr,
        config.api.base_url
    );

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
