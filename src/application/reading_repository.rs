// Repository trait for sensor reading access
use crate::domain::reading::RawReading;
use async_trait::async_trait;

#[async_trait]
pub trait ReadingRepository: Send + Sync {
    /// Latest reading of every device
    async fn latest_readings(&self) -> anyhow::Result<Vec<RawReading>>;

    /// Latest reading of one device, `None` if the device has never reported
    async fn latest_reading(&self, device_code: &str) -> anyhow::Result<Option<RawReading>>;

    /// Readings of one device over the last `hours`, oldest first
    async fn history(&self, device_code: &str, hours: u32) -> anyhow::Result<Vec<RawReading>>;

    async fn health(&self) -> anyhow::Result<()>;
}
