// Telemetry data domain models
use serde::Serialize;
use std::collections::BTreeMap;

use super::device::Metric;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesPoint {
    pub timestamp: String,
    pub time_ms: Option<i64>,
    pub value: Option<f64>,
}

impl TimeSeriesPoint {
    pub fn new(timestamp: String, time_ms: Option<i64>, value: Option<f64>) -> Self {
        Self {
            timestamp,
            time_ms,
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub metric: Metric,
    pub title: String,
    pub unit: String,
    pub y_min: Option<f64>,
    pub y_max: Option<f64>,
    pub points: Vec<TimeSeriesPoint>,
}

impl ChartSeries {
    pub fn new(metric: Metric) -> Self {
        Self {
            metric,
            title: metric.title().to_string(),
            unit: metric.unit().to_string(),
            y_min: None,
            y_max: None,
            points: Vec::new(),
        }
    }

    pub fn push(&mut self, point: TimeSeriesPoint) {
        if let Some(value) = point.value {
            self.y_min = Some(self.y_min.map_or(value, |m| m.min(value)));
            self.y_max = Some(self.y_max.map_or(value, |m| m.max(value)));
        }
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

pub type SeriesMap = BTreeMap<Metric, ChartSeries>;
