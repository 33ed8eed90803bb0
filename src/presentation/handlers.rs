// HTTP request handlers
use crate::domain::device::DeviceCode;
use crate::domain::plant::PlantType;
use crate::infrastructure::chunked_json::stream_from_receiver;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct RangeQuery {
    pub hours: Option<u32>,
}

impl RangeQuery {
    fn hours_or(&self, default: u32) -> u32 {
        self.hours.filter(|h| *h > 0).unwrap_or(default)
    }
}

async fn respond<T: Serialize>(status: StatusCode, data: &T, headers: &HeaderMap) -> Response {
    match json_response(status, data, accepts_brotli(headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

async fn error(status: StatusCode, message: String, headers: &HeaderMap) -> Response {
    respond(status, &json!({ "error": message }), headers).await
}

fn parse_code(code: &str) -> Result<DeviceCode, String> {
    DeviceCode::parse(code).map_err(|e| e.to_string())
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Health of the greenhouse ingestion API
pub async fn upstream_health(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let healthy = state.dashboard_service.upstream_healthy().await;
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    respond(status, &json!({ "healthy": healthy }), &headers).await
}

/// Decode report for the latest reading of every device
pub async fn latest_readings(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    match state.dashboard_service.decode_latest().await {
        Ok(report) => respond(StatusCode::OK, &report, &headers).await,
        Err(e) => {
            tracing::error!("Error fetching latest readings: {:#}", e);
            error(StatusCode::BAD_GATEWAY, e.to_string(), &headers).await
        }
    }
}

pub async fn dashboard(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    match state.dashboard_service.get_dashboard().await {
        Ok(dashboard) => respond(StatusCode::OK, &dashboard, &headers).await,
        Err(e) => {
            tracing::error!("Error building dashboard: {:#}", e);
            error(StatusCode::BAD_GATEWAY, e.to_string(), &headers).await
        }
    }
}

pub async fn plant_overview(
    Path(plant): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let Some(plant) = PlantType::parse(&plant) else {
        return error(StatusCode::NOT_FOUND, format!("unknown plant: {}", plant), &headers).await;
    };
    let overview = state.zone_service.plant_overview(plant).await;
    respond(StatusCode::OK, &overview, &headers).await
}

/// Snapshot, cards and history of one zone
pub async fn zone_view(
    Path(code): Path<String>,
    Query(query): Query<RangeQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let code = match parse_code(&code) {
        Ok(code) => code,
        Err(e) => return error(StatusCode::NOT_FOUND, e, &headers).await,
    };
    let hours = query.hours_or(state.default_hours);
    let view = state.zone_service.zone_view(&code, hours).await;
    respond(StatusCode::OK, &view, &headers).await
}

pub async fn zone_history(
    Path(code): Path<String>,
    Query(query): Query<RangeQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let code = match parse_code(&code) {
        Ok(code) => code,
        Err(e) => return error(StatusCode::NOT_FOUND, e, &headers).await,
    };
    let hours = query.hours_or(state.default_hours);
    match state.zone_service.series(&code, hours).await {
        Ok(series) => respond(StatusCode::OK, &series, &headers).await,
        Err(e) => {
            tracing::error!("Error fetching history for {}: {:#}", code, e);
            error(StatusCode::BAD_GATEWAY, e.to_string(), &headers).await
        }
    }
}

/// Live zone stream (history once, then a snapshot per poll)
pub async fn stream_zone(
    Path(code): Path<String>,
    Query(query): Query<RangeQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let code = match parse_code(&code) {
        Ok(code) => code,
        Err(e) => return error(StatusCode::NOT_FOUND, e, &headers).await,
    };
    let hours = query.hours_or(state.default_hours);
    let rx = state.streaming_service.stream_zone(code, hours);
    stream_from_receiver(rx, accepts_brotli(&headers)).await.into_response()
}
