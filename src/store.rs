mod memory;

pub use memory::*;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    actuator::CommandLogEntry,
    sensor::{Metric, Sample, SensorRecord},
};

/// Append-only per-metric sample storage plus the sensor registry and the
/// actuator command log.
#[async_trait]
pub trait TimeSeriesStore: Send + Sync {
    async fn append(&self, sample: &Sample) -> Result<()>;

    /// Samples of `metric` with `begin < date <= end`, oldest first.
    async fn window(
        &self,
        metric: Metric,
        begin: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Sample>>;

    async fn log_command(&self, entry: &CommandLogEntry) -> Result<()>;

    async fn upsert_sensor(&self, record: &SensorRecord) -> Result<()>;

    async fn sensors(&self) -> Result<Vec<SensorRecord>>;
}
