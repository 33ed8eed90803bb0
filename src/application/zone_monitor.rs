// Per-zone refresh state
use crate::domain::aggregator::build_snapshot_with;
use crate::domain::range_policy::RangePolicy;
use crate::domain::reading::RawReading;
use crate::domain::zone::{ZoneSnapshot, ZoneStatus};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneState {
    Uninitialized,
    Online,
    Offline,
}

/// Tracks one zone across refresh cycles.
///
/// The first failure yields zeroed metrics; later failures keep the
/// last-known metrics and mark the zone offline.
#[derive(Debug, Clone)]
pub struct ZoneMonitor {
    device_code: String,
    policy: RangePolicy,
    state: ZoneState,
    last_known: Option<ZoneSnapshot>,
}

impl ZoneMonitor {
    pub fn new(device_code: impl Into<String>, policy: RangePolicy) -> Self {
        Self {
            device_code: device_code.into(),
            policy,
            state: ZoneState::Uninitialized,
            last_known: None,
        }
    }

    pub fn state(&self) -> ZoneState {
        self.state
    }

    /// Feeds the outcome of one fetch. `None` means no reading was available.
    pub fn observe(&mut self, reading: Option<&RawReading>) -> ZoneSnapshot {
        let fresh = match reading {
            Some(reading) => build_snapshot_with(reading, &self.policy),
            None => ZoneSnapshot::offline(&self.device_code),
        };

        if fresh.is_online() {
            if self.state != ZoneState::Online {
                tracing::info!("Zone {} is online", self.device_code);
            }
            self.state = ZoneState::Online;
            self.last_known = Some(fresh.clone());
            return fresh;
        }

        if self.state != ZoneState::Offline {
            tracing::warn!("Zone {} is offline", self.device_code);
        }
        self.state = ZoneState::Offline;

        match &self.last_known {
            Some(previous) => ZoneSnapshot {
                status: ZoneStatus::Offline,
                ..previous.clone()
            },
            None => fresh,
        }
    }
}
