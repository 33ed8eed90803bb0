// Device codes, device types and the packed field layouts they select
use serde::{Deserialize, Serialize};
use std::fmt;

use super::decoder::DecodeError;

/// Physical quantity reported by a field device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Metric {
    #[serde(rename = "pH")]
    Ph,
    #[serde(rename = "moisture")]
    Moisture,
    #[serde(rename = "ec")]
    Ec,
    #[serde(rename = "temperature")]
    Temperature,
    #[serde(rename = "humidity")]
    Humidity,
    #[serde(rename = "light")]
    Light,
}

impl Metric {
    pub fn key(&self) -> &'static str {
        match self {
            Metric::Ph => "pH",
            Metric::Moisture => "moisture",
            Metric::Ec => "ec",
            Metric::Temperature => "temperature",
            Metric::Humidity => "humidity",
            Metric::Light => "light",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Metric::Ph => "pH",
            Metric::Moisture => "Moisture",
            Metric::Ec => "EC",
            Metric::Temperature => "Temperature",
            Metric::Humidity => "Humidity",
            Metric::Light => "Light",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Metric::Ph | Metric::Ec => "",
            Metric::Moisture | Metric::Humidity => "%",
            Metric::Temperature => "°C",
            Metric::Light => "lx",
        }
    }

    /// Fraction digits used when the value is shown on a card.
    pub fn precision(&self) -> usize {
        match self {
            Metric::Ph | Metric::Ec | Metric::Temperature => 1,
            Metric::Moisture | Metric::Humidity | Metric::Light => 0,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One 16-bit big-endian field of a packed payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub metric: Metric,
    pub divisor: f64,
}

const fn field(metric: Metric, divisor: f64) -> FieldSpec {
    FieldSpec { metric, divisor }
}

const CHILI_LAYOUT: [FieldSpec; 4] = [
    field(Metric::Ph, 100.0),
    field(Metric::Moisture, 10.0),
    field(Metric::Ec, 100.0),
    field(Metric::Temperature, 10.0),
];

const NUTRIENT_LAYOUT: [FieldSpec; 3] = [
    field(Metric::Ph, 100.0),
    field(Metric::Ec, 100.0),
    field(Metric::Temperature, 10.0),
];

const CLIMATE_LAYOUT: [FieldSpec; 3] = [
    field(Metric::Temperature, 10.0),
    field(Metric::Humidity, 10.0),
    field(Metric::Light, 1.0),
];

/// Hex digits per packed field (two bytes).
pub const HEX_DIGITS_PER_FIELD: usize = 4;

/// Device family, selected by the two-letter prefix of a device code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceType {
    /// Chili zones (`CZ`)
    #[serde(rename = "CZ")]
    Cz,
    /// Melon zones (`MZ`)
    #[serde(rename = "MZ")]
    Mz,
    /// Lettuce zones (`SZ`)
    #[serde(rename = "SZ")]
    Sz,
    /// Greenhouse climate sensor (`GZ`)
    #[serde(rename = "GZ")]
    Gz,
}

impl DeviceType {
    pub const ALL: [DeviceType; 4] = [DeviceType::Cz, DeviceType::Mz, DeviceType::Sz, DeviceType::Gz];

    pub fn from_prefix(code: &str) -> Option<Self> {
        match code.get(..2)? {
            "CZ" => Some(DeviceType::Cz),
            "MZ" => Some(DeviceType::Mz),
            "SZ" => Some(DeviceType::Sz),
            "GZ" => Some(DeviceType::Gz),
            _ => None,
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            DeviceType::Cz => "CZ",
            DeviceType::Mz => "MZ",
            DeviceType::Sz => "SZ",
            DeviceType::Gz => "GZ",
        }
    }

    /// Field order and scale divisors of this device's payload.
    pub fn layout(&self) -> &'static [FieldSpec] {
        match self {
            DeviceType::Cz => &CHILI_LAYOUT,
            DeviceType::Mz | DeviceType::Sz => &NUTRIENT_LAYOUT,
            DeviceType::Gz => &CLIMATE_LAYOUT,
        }
    }

    pub fn metric_count(&self) -> usize {
        self.layout().len()
    }

    pub fn metrics(&self) -> impl Iterator<Item = Metric> {
        self.layout().iter().map(|f| f.metric)
    }

    /// Minimum payload length in hex digits.
    pub fn payload_len(&self) -> usize {
        self.metric_count() * HEX_DIGITS_PER_FIELD
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// A parsed device code such as `CZ3`: type prefix plus opaque zone index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceCode {
    pub device_type: DeviceType,
    pub zone: String,
}

impl DeviceCode {
    pub fn new(device_type: DeviceType, zone: impl Into<String>) -> Self {
        Self {
            device_type,
            zone: zone.into(),
        }
    }

    pub fn parse(code: &str) -> Result<Self, DecodeError> {
        let device_type = DeviceType::from_prefix(code)
            .ok_or_else(|| DecodeError::UnknownDeviceCode(code.to_string()))?;
        Ok(Self::new(device_type, &code[2..]))
    }
}

impl fmt::Display for DeviceCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.device_type.prefix(), self.zone)
    }
}
