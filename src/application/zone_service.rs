// Zone service - Use cases for zone pages and plant overviews
use crate::application::reading_repository::ReadingRepository;
use crate::domain::aggregator::{build_series, build_snapshot_with};
use crate::domain::dashboard::{PlantOverview, ZoneView};
use crate::domain::device::DeviceCode;
use crate::domain::plant::PlantType;
use crate::domain::range_policy::RangePolicy;
use crate::domain::telemetry::SeriesMap;
use crate::domain::zone::ZoneSnapshot;
use futures::future::join_all;
use std::sync::Arc;

#[derive(Clone)]
pub struct ZoneService {
    repository: Arc<dyn ReadingRepository>,
    policy: RangePolicy,
}

impl ZoneService {
    pub fn new(repository: Arc<dyn ReadingRepository>, policy: RangePolicy) -> Self {
        Self { repository, policy }
    }

    /// Latest snapshot of a zone. Transport failures yield an offline snapshot.
    pub async fn snapshot(&self, code: &DeviceCode) -> ZoneSnapshot {
        let device_code = code.to_string();
        match self.repository.latest_reading(&device_code).await {
            Ok(Some(reading)) => build_snapshot_with(&reading, &self.policy),
            Ok(None) => {
                tracing::debug!("No reading available for {}", device_code);
                ZoneSnapshot::offline(&device_code)
            }
            Err(e) => {
                tracing::warn!("Error fetching latest reading for {}: {:#}", device_code, e);
                ZoneSnapshot::offline(&device_code)
            }
        }
    }

    pub async fn series(&self, code: &DeviceCode, hours: u32) -> anyhow::Result<SeriesMap> {
        let readings = self.repository.history(&code.to_string(), hours).await?;
        tracing::debug!("Fetched {} readings of history for {}", readings.len(), code);
        Ok(build_series(&readings))
    }

    /// Snapshot and history fetched concurrently; either may fail alone.
    pub async fn zone_view(&self, code: &DeviceCode, hours: u32) -> ZoneView {
        let (snapshot, series) = tokio::join!(self.snapshot(code), self.series(code, hours));

        let series = series.unwrap_or_else(|e| {
            tracing::warn!("Error fetching history for {}: {:#}", code, e);
            SeriesMap::new()
        });

        ZoneView::new(snapshot, series)
    }

    pub async fn plant_overview(&self, plant: PlantType) -> PlantOverview {
        let codes = plant.zone_codes();
        let zones = join_all(codes.iter().map(|code| self.snapshot(code))).await;
        PlantOverview::new(plant, zones)
    }
}
