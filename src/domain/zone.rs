// Zone snapshot domain model
use serde::Serialize;

use super::device::DeviceCode;
use super::plant::PlantType;
use super::reading::DecodedSample;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneStatus {
    Online,
    Offline,
}

/// Current metrics of one zone, produced fresh on every refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneSnapshot {
    pub zone_id: String,
    pub device_code: String,
    pub plant_type: Option<PlantType>,
    pub metrics: Option<DecodedSample>,
    pub last_updated: Option<String>,
    pub status: ZoneStatus,
}

impl ZoneSnapshot {
    pub fn online(code: &DeviceCode, metrics: DecodedSample, last_updated: String) -> Self {
        Self {
            zone_id: code.zone.clone(),
            device_code: code.to_string(),
            plant_type: Some(PlantType::from_device_type(code.device_type)),
            metrics: Some(metrics),
            last_updated: Some(last_updated),
            status: ZoneStatus::Online,
        }
    }

    /// Offline snapshot with zeroed metrics. An unparseable device code
    /// leaves the plant type and metrics empty.
    pub fn offline(device_code: &str) -> Self {
        match DeviceCode::parse(device_code) {
            Ok(code) => Self {
                zone_id: code.zone.clone(),
                device_code: code.to_string(),
                plant_type: Some(PlantType::from_device_type(code.device_type)),
                metrics: Some(DecodedSample::zeroed(code.device_type)),
                last_updated: None,
                status: ZoneStatus::Offline,
            },
            Err(_) => Self {
                zone_id: String::new(),
                device_code: device_code.to_string(),
                plant_type: None,
                metrics: None,
                last_updated: None,
                status: ZoneStatus::Offline,
            },
        }
    }

    pub fn is_online(&self) -> bool {
        self.status == ZoneStatus::Online
    }
}
