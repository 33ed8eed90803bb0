// Presentation layer - HTTP routes
pub mod app_state;
pub mod handlers;

use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    dashboard, health_check, latest_readings, plant_overview, stream_zone, upstream_health, zone_history,
    zone_view,
};
use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/health/upstream", get(upstream_health))
        .route("/readings/latest", get(latest_readings))
        .route("/dashboard", get(dashboard))
        .route("/plants/:plant", get(plant_overview))
        .route("/zones/:code", get(zone_view))
        .route("/zones/:code/history", get(zone_history))
        .route("/zones/:code/stream", get(stream_zone))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
