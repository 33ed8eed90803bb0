// Raw readings from the ingestion API and their decoded form
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

use super::device::{DeviceType, Metric};

/// One device payload at one sampling instant, as delivered by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawReading {
    #[serde(default, deserialize_with = "lenient_string")]
    pub encoded_data: String,
    /// ISO-8601, kept verbatim
    #[serde(default, deserialize_with = "lenient_string")]
    pub timestamp: String,
    #[serde(rename = "zone_code", alias = "device_code")]
    pub device_code: String,
}

/// Null or non-string fields become empty, so one bad reading never
/// rejects the batch it arrived in.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        _ => Ok(String::new()),
    }
}

impl RawReading {
    pub fn new(
        encoded_data: impl Into<String>,
        timestamp: impl Into<String>,
        device_code: impl Into<String>,
    ) -> Self {
        Self {
            encoded_data: encoded_data.into(),
            timestamp: timestamp.into(),
            device_code: device_code.into(),
        }
    }

    /// Milliseconds since the epoch, if the timestamp is RFC 3339.
    pub fn time_ms(&self) -> Option<i64> {
        parse_timestamp_ms(&self.timestamp)
    }
}

/// Parses an ISO-8601 timestamp. Offset-less values are taken as UTC.
pub fn parse_timestamp_ms(timestamp: &str) -> Option<i64> {
    if let Ok(time) = chrono::DateTime::parse_from_rfc3339(timestamp) {
        return Some(time.timestamp_millis());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| chrono::NaiveDateTime::parse_from_str(timestamp, fmt).ok())
        .map(|naive| naive.and_utc().timestamp_millis())
}

/// Physical values decoded from one payload.
///
/// Holds exactly the metrics of `device_type`'s layout.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedSample {
    device_type: DeviceType,
    values: BTreeMap<Metric, f64>,
}

impl DecodedSample {
    pub(crate) fn new(device_type: DeviceType, values: BTreeMap<Metric, f64>) -> Self {
        Self { device_type, values }
    }

    /// Every metric of the device type set to zero.
    pub fn zeroed(device_type: DeviceType) -> Self {
        let values = device_type.metrics().map(|m| (m, 0.0)).collect();
        Self::new(device_type, values)
    }

    pub fn device_type(&self) -> DeviceType {
        self.device_type
    }

    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.values.get(&metric).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, f64)> + '_ {
        self.values.iter().map(|(m, v)| (*m, *v))
    }

    pub fn metrics(&self) -> impl Iterator<Item = Metric> + '_ {
        self.values.keys().copied()
    }

    /// Applies `f` to every value, keeping the key set.
    pub fn map_values(&self, mut f: impl FnMut(Metric, f64) -> f64) -> Self {
        let values = self.values.iter().map(|(m, v)| (*m, f(*m, *v))).collect();
        Self::new(self.device_type, values)
    }
}

impl Serialize for DecodedSample {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.values.iter())
    }
}
