// Greenhouse ingestion API repository implementation
use crate::application::reading_repository::ReadingRepository;
use crate::domain::reading::RawReading;
use crate::infrastructure::config::{ApiPaths, ApiSettings, prepare_path};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

/// Connection context handed to the client instead of global state.
#[derive(Debug, Clone)]
pub struct ApiSession {
    pub base_url: String,
    pub api_key: String,
}

impl ApiSession {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GreenhouseApiClient {
    client: reqwest::Client,
    session: ApiSession,
    paths: ApiPaths,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReadingsResponse {
    Bare(Vec<RawReading>),
    Readings { readings: Vec<RawReading> },
    Data { data: Vec<RawReading> },
}

impl ReadingsResponse {
    fn into_readings(self) -> Vec<RawReading> {
        match self {
            ReadingsResponse::Bare(readings)
            | ReadingsResponse::Readings { readings }
            | ReadingsResponse::Data { data: readings } => readings,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReadingResponse {
    Bare(RawReading),
    Reading { reading: RawReading },
    Data { data: RawReading },
    Many(ReadingsResponse),
}

impl ReadingResponse {
    fn into_reading(self) -> Option<RawReading> {
        match self {
            ReadingResponse::Bare(reading)
            | ReadingResponse::Reading { reading }
            | ReadingResponse::Data { data: reading } => Some(reading),
            ReadingResponse::Many(many) => many.into_readings().into_iter().next(),
        }
    }
}

impl GreenhouseApiClient {
    pub fn new(session: ApiSession, settings: &ApiSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            session,
            paths: settings.paths.clone(),
        })
    }

    fn build_url(&self, template: &str, device_code: Option<&str>, hours: Option<u32>) -> String {
        let mut vars = HashMap::new();
        if let Some(device_code) = device_code {
            vars.insert("device".to_string(), device_code.to_string());
        }
        if let Some(hours) = hours {
            vars.insert("hours".to_string(), hours.to_string());
        }
        format!("{}{}", self.session.base_url, prepare_path(template, &vars))
    }

    /// GET `url`; `Ok(None)` on 404.
    async fn execute<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header("X-API-KEY", &self.session.api_key)
            .header("Accept", "application/json")
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Greenhouse API request failed with status {}: {}", status, body);
        }

        let data = response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to parse response from {}", url))?;
        Ok(Some(data))
    }
}

#[async_trait]
impl ReadingRepository for GreenhouseApiClient {
    async fn latest_readings(&self) -> Result<Vec<RawReading>> {
        let url = self.build_url(&self.paths.latest_readings, None, None);
        let response: Option<ReadingsResponse> = self.execute(&url).await?;
        Ok(response.map(ReadingsResponse::into_readings).unwrap_or_default())
    }

    async fn latest_reading(&self, device_code: &str) -> Result<Option<RawReading>> {
        let url = self.build_url(&self.paths.device_latest, Some(device_code), None);
        let response: Option<ReadingResponse> = self.execute(&url).await?;
        Ok(response.and_then(ReadingResponse::into_reading))
    }

    async fn history(&self, device_code: &str, hours: u32) -> Result<Vec<RawReading>> {
        let url = self.build_url(&self.paths.history, Some(device_code), Some(hours));
        let response: Option<ReadingsResponse> = self.execute(&url).await?;
        let readings = response.map(ReadingsResponse::into_readings).unwrap_or_default();
        tracing::debug!("Got {} history readings for {}", readings.len(), device_code);
        Ok(readings)
    }

    async fn health(&self) -> Result<()> {
        let url = self.build_url(&self.paths.health, None, None);
        match self.execute::<serde_json::Value>(&url).await? {
            Some(_) => Ok(()),
            None => anyhow::bail!("Health endpoint not found at {}", url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path;
    use axum::http::HeaderMap;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{Value, json};

    fn reading_json(code: &str, hex: &str, timestamp: &str) -> Value {
        json!({ "zone_code": code, "encoded_data": hex, "timestamp": timestamp })
    }

    fn check_key(headers: &HeaderMap) -> Result<(), StatusCode> {
        match headers.get("X-API-KEY").and_then(|v| v.to_str().ok()) {
            Some("test-key") => Ok(()),
            _ => Err(StatusCode::UNAUTHORIZED),
        }
    }

    async fn latest_readings_handler(headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
        check_key(&headers)?;
        Ok(Json(json!({
            "readings": [
                reading_json("CZ1", "0290029400C800FA", "2025-03-01T10:00:00Z"),
                reading_json("GZ1", "00C801B80036", "2025-03-01T10:00:00Z"),
            ]
        })))
    }

    async fn device_latest_handler(
        Path(code): Path<String>,
        headers: HeaderMap,
    ) -> Result<Json<Value>, StatusCode> {
        check_key(&headers)?;
        match code.as_str() {
            "CZ1" => Ok(Json(reading_json("CZ1", "0290029400C800FA", "2025-03-01T10:00:00Z"))),
            "MZ1" => Ok(Json(json!({ "data": reading_json("MZ1", "028A00E600FF", "2025-03-01T10:00:00Z") }))),
            "SZ1" => Err(StatusCode::INTERNAL_SERVER_ERROR),
            _ => Err(StatusCode::NOT_FOUND),
        }
    }

    async fn history_handler(
        Path((code, hours)): Path<(String, u32)>,
        headers: HeaderMap,
    ) -> Result<Json<Value>, StatusCode> {
        check_key(&headers)?;
        if code == "MZ1" {
            return Ok(Json(json!([
                reading_json("MZ1", "028A00E600FF", "2025-03-01T00:00:00Z"),
                { "encoded_data": null, "timestamp": null, "zone_code": "MZ1" },
                reading_json("MZ1", "028000DC0104", "2025-03-01T02:00:00Z"),
            ])));
        }
        let readings: Vec<Value> = (0..hours.min(3))
            .map(|h| reading_json(&code, "0290029400C800FA", &format!("2025-03-01T0{}:00:00Z", h)))
            .collect();
        Ok(Json(Value::Array(readings)))
    }

    async fn spawn_api() -> String {
        let router = Router::new()
            .route("/api/latest-readings", get(latest_readings_handler))
            .route("/api/latest-readings/:code", get(device_latest_handler))
            .route("/api/:code/:hours", get(history_handler))
            .route("/api/health", get(|| async { Json(json!({ "status": "ok" })) }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/", addr)
    }

    async fn client(api_key: &str) -> GreenhouseApiClient {
        let base_url = spawn_api().await;
        GreenhouseApiClient::new(ApiSession::new(base_url, api_key), &ApiSettings::default()).unwrap()
    }

    #[tokio::test]
    async fn test_latest_readings() {
        let client = client("test-key").await;
        let readings = client.latest_readings().await.unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[1].device_code, "GZ1");
        assert_eq!(readings[1].encoded_data, "00C801B80036");
    }

    #[tokio::test]
    async fn test_latest_reading_envelopes() {
        let client = client("test-key").await;

        let reading = client.latest_reading("CZ1").await.unwrap().unwrap();
        assert_eq!(reading.encoded_data, "0290029400C800FA");

        let reading = client.latest_reading("MZ1").await.unwrap().unwrap();
        assert_eq!(reading.device_code, "MZ1");

        assert!(client.latest_reading("GZ9").await.unwrap().is_none());
        assert!(client.latest_reading("SZ1").await.is_err());
    }

    #[tokio::test]
    async fn test_history() {
        let client = client("test-key").await;
        let readings = client.history("CZ1", 24).await.unwrap();
        assert_eq!(readings.len(), 3);
        assert_eq!(readings[2].timestamp, "2025-03-01T02:00:00Z");
    }

    #[tokio::test]
    async fn test_history_keeps_batch_with_null_payload() {
        let client = client("test-key").await;
        let readings = client.history("MZ1", 24).await.unwrap();
        assert_eq!(readings.len(), 3);
        assert_eq!(readings[1].encoded_data, "");
        assert_eq!(readings[1].timestamp, "");

        let series = crate::domain::aggregator::build_series(&readings);
        assert_eq!(series[&crate::domain::device::Metric::Ph].len(), 2);
    }

    #[tokio::test]
    async fn test_rejected_api_key() {
        let client = client("wrong").await;
        let err = client.latest_readings().await.unwrap_err();
        assert!(err.to_string().contains("401"));
        assert!(client.health().await.is_ok());
    }
}
