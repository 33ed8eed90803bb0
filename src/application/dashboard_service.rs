// Dashboard service - Use case for the greenhouse overview
use crate::application::reading_repository::ReadingRepository;
use crate::domain::aggregator::build_snapshot_with;
use crate::domain::dashboard::{Dashboard, QuickStats, RoomConditions};
use crate::domain::decoder::try_decode_as;
use crate::domain::device::{DeviceCode, DeviceType};
use crate::domain::plant::PlantType;
use crate::domain::range_policy::RangePolicy;
use crate::domain::reading::DecodedSample;
use crate::domain::zone::ZoneSnapshot;
use serde::Serialize;
use std::sync::Arc;

const CLIMATE_SENSOR: &str = "GZ1";

/// Outcome of decoding one reading of the latest batch.
#[derive(Debug, Clone, Serialize)]
pub struct DecodeEntry {
    pub device_code: String,
    pub timestamp: String,
    pub decoded: Option<DecodedSample>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DecodeReport {
    pub total: usize,
    pub decoded: usize,
    pub failed: usize,
    pub entries: Vec<DecodeEntry>,
}

#[derive(Clone)]
pub struct DashboardService {
    repository: Arc<dyn ReadingRepository>,
    policy: RangePolicy,
}

impl DashboardService {
    pub fn new(repository: Arc<dyn ReadingRepository>, policy: RangePolicy) -> Self {
        Self { repository, policy }
    }

    pub async fn get_dashboard(&self) -> anyhow::Result<Dashboard> {
        let readings = self.repository.latest_readings().await?;
        let snapshots: Vec<ZoneSnapshot> = readings
            .iter()
            .map(|r| build_snapshot_with(r, &self.policy))
            .collect();

        let room_conditions = Self::climate_snapshot(&snapshots).and_then(RoomConditions::from_snapshot);
        if room_conditions.is_none() {
            tracing::debug!("No greenhouse climate reading in latest batch");
        }

        let quick_stats = QuickStats::from_snapshots(&snapshots);
        let total_zones = [PlantType::Cabai, PlantType::Selada, PlantType::Melon]
            .iter()
            .map(|p| p.zone_count() as usize)
            .sum();
        let active_zones = snapshots
            .iter()
            .filter(|s| s.is_online() && s.plant_type.is_some_and(|p| p.is_crop()))
            .count();

        Ok(Dashboard::new(
            "Greenhouse Overview".to_string(),
            room_conditions,
            quick_stats,
            total_zones,
            active_zones,
        ))
    }

    /// Prefers `GZ1`, falling back to any other climate sensor.
    fn climate_snapshot(snapshots: &[ZoneSnapshot]) -> Option<&ZoneSnapshot> {
        snapshots
            .iter()
            .find(|s| s.device_code == CLIMATE_SENSOR)
            .or_else(|| {
                snapshots
                    .iter()
                    .find(|s| s.device_code.starts_with(DeviceType::Gz.prefix()))
            })
    }

    /// Decodes every reading of the latest batch and reports failures.
    pub async fn decode_latest(&self) -> anyhow::Result<DecodeReport> {
        let readings = self.repository.latest_readings().await?;

        let entries: Vec<DecodeEntry> = readings
            .into_iter()
            .map(|reading| {
                let result = DeviceCode::parse(&reading.device_code)
                    .and_then(|code| try_decode_as(&reading.encoded_data, code.device_type));
                let (decoded, error) = match result {
                    Ok(sample) => (Some(sample), None),
                    Err(e) => {
                        tracing::warn!("Failed to decode reading of {}: {}", reading.device_code, e);
                        (None, Some(e.to_string()))
                    }
                };
                DecodeEntry {
                    device_code: reading.device_code,
                    timestamp: reading.timestamp,
                    decoded,
                    error,
                }
            })
            .collect();

        let decoded = entries.iter().filter(|e| e.decoded.is_some()).count();
        Ok(DecodeReport {
            total: entries.len(),
            decoded,
            failed: entries.len() - decoded,
            entries,
        })
    }

    pub async fn upstream_healthy(&self) -> bool {
        match self.repository.health().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Greenhouse API health check failed: {:#}", e);
                false
            }
        }
    }
}
