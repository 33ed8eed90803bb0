use crate::domain::range_policy::RangePolicy;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub api: ApiSettings,
    pub monitor: MonitorSettings,
    pub ranges: RangePolicy,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
    pub bind_addr: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
    pub paths: ApiPaths,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://kedairekagreenhouse.my.id".to_string(),
            api_key: String::new(),
            timeout_secs: 10,
            paths: ApiPaths::default(),
        }
    }
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Endpoint templates; `${device}` and `${hours}` are substituted per request.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ApiPaths {
    pub latest_readings: String,
    pub device_latest: String,
    pub history: String,
    pub health: String,
}

impl Default for ApiPaths {
    fn default() -> Self {
        Self {
            latest_readings: "/api/latest-readings".to_string(),
            device_latest: "/api/latest-readings/${device}".to_string(),
            history: "/api/${device}/${hours}".to_string(),
            health: "/api/health".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MonitorSettings {
    pub poll_interval_secs: u64,
    pub history_hours: u32,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: 30,
            history_hours: 24,
        }
    }
}

impl MonitorSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

/// Loads `config/greenhouse.{toml,yaml,json}` if present, then
/// `GREENHOUSE__SECTION__KEY` environment overrides.
pub fn load_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/greenhouse").required(false))
        .add_source(
            config::Environment::with_prefix("GREENHOUSE")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Replace template variables in an endpoint path
pub fn prepare_path(template: &str, vars: &HashMap<String, String>) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        let placeholder = format!("${{{}}}", key);
        result = result.replace(&placeholder, &urlencoding::encode(value));
    }
    result
}
