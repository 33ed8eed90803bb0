// Streaming zone service - Live snapshots by polling the latest reading
use crate::application::reading_repository::ReadingRepository;
use crate::application::zone_monitor::{ZoneMonitor, ZoneState};
use crate::domain::aggregator::build_series;
use crate::domain::device::DeviceCode;
use crate::domain::range_policy::RangePolicy;
use crate::domain::telemetry::SeriesMap;
use crate::domain::zone::ZoneSnapshot;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::IntervalStream;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamMessage {
    Series {
        device_code: String,
        hours: u32,
        series: SeriesMap,
    },
    Snapshot {
        state: ZoneState,
        snapshot: ZoneSnapshot,
    },
}

#[derive(Clone)]
pub struct StreamingZoneService {
    repository: Arc<dyn ReadingRepository>,
    policy: RangePolicy,
    poll_interval: Duration,
}

impl StreamingZoneService {
    pub fn new(repository: Arc<dyn ReadingRepository>, policy: RangePolicy, poll_interval: Duration) -> Self {
        Self {
            repository,
            policy,
            poll_interval,
        }
    }

    /// Sends the history window once, then a snapshot per poll until the
    /// receiver is dropped.
    pub fn stream_zone(&self, code: DeviceCode, hours: u32) -> mpsc::Receiver<StreamMessage> {
        let (tx, rx) = mpsc::channel(16);
        let repo = self.repository.clone();
        let policy = self.policy.clone();
        let poll_interval = self.poll_interval;

        tokio::spawn(async move {
            let device_code = code.to_string();

            let series = match repo.history(&device_code, hours).await {
                Ok(readings) => build_series(&readings),
                Err(e) => {
                    tracing::warn!("Error fetching history for {}: {:#}", device_code, e);
                    SeriesMap::new()
                }
            };
            let msg = StreamMessage::Series {
                device_code: device_code.clone(),
                hours,
                series,
            };
            if tx.send(msg).await.is_err() {
                return;
            }

            let mut monitor = ZoneMonitor::new(device_code.clone(), policy);
            let mut ticks = IntervalStream::new(tokio::time::interval(poll_interval));

            while ticks.next().await.is_some() {
                let reading = match repo.latest_reading(&device_code).await {
                    Ok(reading) => reading,
                    Err(e) => {
                        tracing::warn!("Error polling {}: {:#}", device_code, e);
                        None
                    }
                };

                let snapshot = monitor.observe(reading.as_ref());
                let msg = StreamMessage::Snapshot {
                    state: monitor.state(),
                    snapshot,
                };
                if tx.send(msg).await.is_err() {
                    tracing::debug!("Stream for {} closed by client", device_code);
                    break;
                }
            }
        });

        rx
    }
}
