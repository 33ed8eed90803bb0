// Dashboard domain models
use serde::Serialize;

use super::device::Metric;
use super::plant::{MetricStatus, OptimalConditions, PlantType};
use super::reading::DecodedSample;
use super::telemetry::SeriesMap;
use super::zone::ZoneSnapshot;

/// One metric as shown on a zone card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricCard {
    pub metric: Metric,
    pub title: String,
    pub unit: String,
    pub value: f64,
    pub precision: usize,
    pub display: String,
    pub status: MetricStatus,
}

impl MetricCard {
    pub fn new(metric: Metric, value: f64, conditions: Option<&OptimalConditions>) -> Self {
        let status = conditions
            .map(|c| c.classify(metric, value))
            .unwrap_or(MetricStatus::Normal);
        Self {
            metric,
            title: metric.title().to_string(),
            unit: metric.unit().to_string(),
            value,
            precision: metric.precision(),
            display: format_metric(metric, value),
            status,
        }
    }

    pub fn from_sample(sample: &DecodedSample, conditions: Option<&OptimalConditions>) -> Vec<Self> {
        sample
            .iter()
            .map(|(metric, value)| Self::new(metric, value, conditions))
            .collect()
    }
}

pub fn format_metric(metric: Metric, value: f64) -> String {
    let number = format!("{:.*}", metric.precision(), value);
    match metric {
        Metric::Temperature => format!("{}°C", number),
        Metric::Moisture | Metric::Humidity => format!("{}%", number),
        Metric::Light => format!("{} lx", number),
        Metric::Ph | Metric::Ec => number,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ZoneView {
    pub title: String,
    pub snapshot: ZoneSnapshot,
    pub cards: Vec<MetricCard>,
    pub series: SeriesMap,
}

impl ZoneView {
    pub fn new(snapshot: ZoneSnapshot, series: SeriesMap) -> Self {
        let conditions = snapshot.plant_type.and_then(|p| p.conditions());
        let cards = snapshot
            .metrics
            .as_ref()
            .map(|m| MetricCard::from_sample(m, conditions))
            .unwrap_or_default();
        let title = match snapshot.plant_type {
            Some(plant) => format!("{} Zone {}", plant, snapshot.zone_id),
            None => snapshot.device_code.clone(),
        };
        Self {
            title,
            snapshot,
            cards,
            series,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlantOverview {
    pub plant: PlantType,
    pub name: String,
    pub conditions: Option<OptimalConditions>,
    pub zones: Vec<ZoneSnapshot>,
    pub active_zones: usize,
}

impl PlantOverview {
    pub fn new(plant: PlantType, zones: Vec<ZoneSnapshot>) -> Self {
        let active_zones = zones.iter().filter(|z| z.is_online()).count();
        Self {
            plant,
            name: plant.name().to_string(),
            conditions: plant.conditions().copied(),
            zones,
            active_zones,
        }
    }
}

/// Climate inside the greenhouse, from the `GZ` sensor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomConditions {
    pub temperature: f64,
    pub humidity: f64,
    pub light: f64,
    pub last_updated: Option<String>,
}

impl RoomConditions {
    pub fn from_snapshot(snapshot: &ZoneSnapshot) -> Option<Self> {
        if !snapshot.is_online() {
            return None;
        }
        let metrics = snapshot.metrics.as_ref()?;
        Some(Self {
            temperature: metrics.get(Metric::Temperature)?,
            humidity: metrics.get(Metric::Humidity)?,
            light: metrics.get(Metric::Light)?,
            last_updated: snapshot.last_updated.clone(),
        })
    }
}

/// Averages over the online crop zones of one batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuickStats {
    pub avg_ph: Option<f64>,
    pub avg_temperature: Option<f64>,
    pub avg_ec: Option<f64>,
    pub avg_moisture: Option<f64>,
}

impl QuickStats {
    pub fn from_snapshots<'a>(snapshots: impl IntoIterator<Item = &'a ZoneSnapshot> + Clone) -> Self {
        let average = |metric: Metric| {
            let values: Vec<f64> = snapshots
                .clone()
                .into_iter()
                .filter(|s| s.is_online() && s.plant_type.is_some_and(|p| p.is_crop()))
                .filter_map(|s| s.metrics.as_ref()?.get(metric))
                .collect();
            if values.is_empty() {
                None
            } else {
                Some(values.iter().sum::<f64>() / values.len() as f64)
            }
        };

        Self {
            avg_ph: average(Metric::Ph),
            avg_temperature: average(Metric::Temperature),
            avg_ec: average(Metric::Ec),
            avg_moisture: average(Metric::Moisture),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub title: String,
    pub room_conditions: Option<RoomConditions>,
    pub quick_stats: QuickStats,
    pub total_zones: usize,
    pub active_zones: usize,
}

impl Dashboard {
    pub fn new(
        title: String,
        room_conditions: Option<RoomConditions>,
        quick_stats: QuickStats,
        total_zones: usize,
        active_zones: usize,
    ) -> Self {
        Self {
            title,
            room_conditions,
            quick_stats,
            total_zones,
            active_zones,
        }
    }
}
