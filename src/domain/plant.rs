// Crop catalog and optimal growing conditions
use serde::{Deserialize, Serialize};
use std::fmt;

use super::device::{DeviceCode, DeviceType, Metric};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlantType {
    Cabai,
    Selada,
    Melon,
    Greenhouse,
}

impl PlantType {
    pub fn from_device_type(device_type: DeviceType) -> Self {
        match device_type {
            DeviceType::Cz => PlantType::Cabai,
            DeviceType::Sz => PlantType::Selada,
            DeviceType::Mz => PlantType::Melon,
            DeviceType::Gz => PlantType::Greenhouse,
        }
    }

    pub fn device_type(&self) -> DeviceType {
        match self {
            PlantType::Cabai => DeviceType::Cz,
            PlantType::Selada => DeviceType::Sz,
            PlantType::Melon => DeviceType::Mz,
            PlantType::Greenhouse => DeviceType::Gz,
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "cabai" | "chili" => Some(PlantType::Cabai),
            "selada" | "lettuce" => Some(PlantType::Selada),
            "melon" => Some(PlantType::Melon),
            "greenhouse" => Some(PlantType::Greenhouse),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PlantType::Cabai => "Cabai",
            PlantType::Selada => "Selada",
            PlantType::Melon => "Melon",
            PlantType::Greenhouse => "Greenhouse",
        }
    }

    pub fn zone_count(&self) -> u32 {
        match self {
            PlantType::Cabai => 6,
            PlantType::Selada => 1,
            PlantType::Melon => 5,
            PlantType::Greenhouse => 1,
        }
    }

    /// Device codes of every zone, `CZ1`..`CZ6` and so on.
    pub fn zone_codes(&self) -> Vec<DeviceCode> {
        (1..=self.zone_count())
            .map(|zone| DeviceCode::new(self.device_type(), zone.to_string()))
            .collect()
    }

    pub fn is_crop(&self) -> bool {
        !matches!(self, PlantType::Greenhouse)
    }

    pub fn conditions(&self) -> Option<&'static OptimalConditions> {
        match self {
            PlantType::Cabai => Some(&CABAI),
            PlantType::Selada => Some(&SELADA),
            PlantType::Melon => Some(&MELON),
            PlantType::Greenhouse => None,
        }
    }
}

impl fmt::Display for PlantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Condition {
    pub min: f64,
    pub max: f64,
    pub optimal: f64,
}

impl Condition {
    const fn new(min: f64, max: f64, optimal: f64) -> Self {
        Self { min, max, optimal }
    }

    pub fn classify(&self, value: f64) -> MetricStatus {
        if value < self.min || value > self.max {
            MetricStatus::Warning
        } else if (value - self.optimal).abs() <= (self.max - self.min) * 0.1 {
            MetricStatus::Optimal
        } else {
            MetricStatus::Normal
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OptimalConditions {
    pub ph: Condition,
    pub temperature: Condition,
    pub ec: Condition,
    pub moisture: Condition,
}

impl OptimalConditions {
    pub fn for_metric(&self, metric: Metric) -> Option<&Condition> {
        match metric {
            Metric::Ph => Some(&self.ph),
            Metric::Temperature => Some(&self.temperature),
            Metric::Ec => Some(&self.ec),
            Metric::Moisture => Some(&self.moisture),
            Metric::Humidity | Metric::Light => None,
        }
    }

    pub fn classify(&self, metric: Metric, value: f64) -> MetricStatus {
        self.for_metric(metric)
            .map(|c| c.classify(value))
            .unwrap_or(MetricStatus::Normal)
    }
}

static CABAI: OptimalConditions = OptimalConditions {
    ph: Condition::new(6.0, 7.0, 6.5),
    temperature: Condition::new(22.0, 30.0, 26.0),
    ec: Condition::new(1.8, 2.5, 2.1),
    moisture: Condition::new(60.0, 75.0, 68.0),
};

static SELADA: OptimalConditions = OptimalConditions {
    ph: Condition::new(6.0, 7.0, 6.5),
    temperature: Condition::new(20.0, 25.0, 23.0),
    ec: Condition::new(1.5, 2.0, 1.8),
    moisture: Condition::new(65.0, 80.0, 70.0),
};

static MELON: OptimalConditions = OptimalConditions {
    ph: Condition::new(6.0, 6.8, 6.2),
    temperature: Condition::new(25.0, 32.0, 28.0),
    ec: Condition::new(2.0, 2.8, 2.3),
    moisture: Condition::new(55.0, 70.0, 60.0),
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricStatus {
    Optimal,
    Normal,
    Warning,
}
