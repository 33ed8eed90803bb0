// Physical plausibility bounds for decoded values
use serde::Deserialize;

use super::device::Metric;
use super::reading::DecodedSample;

/// Value a metric is replaced with when it falls outside its bounds.
pub const NO_READING: f64 = 0.0;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ValidRange {
    pub min: f64,
    pub max: f64,
}

impl ValidRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Per-metric inclusive bounds. A metric with no bounds is always accepted.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RangePolicy {
    pub ph: Option<ValidRange>,
    pub temperature: Option<ValidRange>,
    pub ec: Option<ValidRange>,
    pub moisture: Option<ValidRange>,
    pub humidity: Option<ValidRange>,
    pub light: Option<ValidRange>,
}

impl Default for RangePolicy {
    fn default() -> Self {
        Self {
            ph: Some(ValidRange::new(0.0, 14.0)),
            temperature: Some(ValidRange::new(-10.0, 60.0)),
            ec: Some(ValidRange::new(0.0, 10.0)),
            moisture: Some(ValidRange::new(0.0, 100.0)),
            humidity: Some(ValidRange::new(0.0, 100.0)),
            light: None,
        }
    }
}

impl RangePolicy {
    pub fn range_for(&self, metric: Metric) -> Option<ValidRange> {
        match metric {
            Metric::Ph => self.ph,
            Metric::Temperature => self.temperature,
            Metric::Ec => self.ec,
            Metric::Moisture => self.moisture,
            Metric::Humidity => self.humidity,
            Metric::Light => self.light,
        }
    }

    pub fn clamp_value(&self, metric: Metric, value: f64) -> f64 {
        match self.range_for(metric) {
            Some(range) if !range.contains(value) => NO_READING,
            _ => value,
        }
    }

    /// Replaces every out-of-range value with [`NO_READING`].
    pub fn clamp(&self, sample: &DecodedSample) -> DecodedSample {
        sample.map_values(|metric, value| {
            let clamped = self.clamp_value(metric, value);
            if clamped != value {
                tracing::debug!(
                    "{} value {} outside plausible range, replaced with {}",
                    metric,
                    value,
                    NO_READING
                );
            }
            clamped
        })
    }
}
