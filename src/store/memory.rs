use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::{
    actuator::CommandLogEntry,
    sensor::{Metric, Sample, SensorRecord},
    store::TimeSeriesStore,
};

#[derive(Debug, Default)]
pub struct MemoryStore {
    samples: RwLock<HashMap<Metric, Vec<Sample>>>,
    commands: RwLock<Vec<CommandLogEntry>>,
    sensors: RwLock<Vec<SensorRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn samples(&self, metric: Metric) -> Vec<Sample> {
        self.samples
            .read()
            .await
            .get(&metric)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn commands(&self) -> Vec<CommandLogEntry> {
        self.commands.read().await.clone()
    }
}

#[async_trait]
impl TimeSeriesStore for MemoryStore {
    async fn append(&self, sample: &Sample) -> Result<()> {
        let mut samples = self.samples.write().await;
        let series = samples.entry(sample.metric).or_default();

        let at = series.partition_point(|s| s.timestamp <= sample.timestamp);
        series.insert(at, sample.clone());

        Ok(())
    }

    async fn window(
        &self,
        metric: Metric,
        begin: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Sample>> {
        Ok(self
            .samples
            .read()
            .await
            .get(&metric)
            .map(|series| {
                series
                    .iter()
                    .filter(|s| s.timestamp > begin && s.timestamp <= end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn log_command(&self, entry: &CommandLogEntry) -> Result<()> {
        self.commands.write().await.push(entry.clone());

        Ok(())
    }

    async fn upsert_sensor(&self, record: &SensorRecord) -> Result<()> {
        let mut sensors = self.sensors.write().await;
        match sensors.iter_mut().find(|r| r.name == record.name) {
            Some(existing) => *existing = record.clone(),
            None => sensors.push(record.clone()),
        }

        Ok(())
    }

    async fn sensors(&self) -> Result<Vec<SensorRecord>> {
        Ok(self.sensors.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;

    fn sample(metric: Metric, value: f64, timestamp: DateTime<Utc>) -> Sample {
        Sample {
            sensor_id: metric.as_str().to_owned(),
            metric,
            value,
            timestamp,
        }
    }

    #[tokio::test]
    async fn window_is_left_open_and_ordered() {
        let store = MemoryStore::new();
        let t0 = Utc::now();

        store.append(&sample(Metric::Co2, 3.0, t0 + TimeDelta::seconds(30))).await.unwrap();
        store.append(&sample(Metric::Co2, 1.0, t0)).await.unwrap();
        store.append(&sample(Metric::Co2, 2.0, t0 + TimeDelta::seconds(10))).await.unwrap();
        store.append(&sample(Metric::Humidity, 50.0, t0 + TimeDelta::seconds(10))).await.unwrap();

        let got = store
            .window(Metric::Co2, t0, t0 + TimeDelta::seconds(30))
            .await
            .unwrap();
        assert_eq!(got.iter().map(|s| s.value).collect::<Vec<_>>(), [2.0, 3.0]);

        let all = store.samples(Metric::Co2).await;
        assert_eq!(all.iter().map(|s| s.value).collect::<Vec<_>>(), [1.0, 2.0, 3.0]);
    }

    #[tokio::test]
    async fn upsert_sensor_replaces_by_name() {
        let store = MemoryStore::new();
        let record = |token: &str| SensorRecord {
            name: "co2".to_owned(),
            token: token.to_owned(),
            pragma: "co2".to_owned(),
        };

        store.upsert_sensor(&record("a")).await.unwrap();
        store.upsert_sensor(&record("b")).await.unwrap();

        assert_eq!(store.sensors().await.unwrap(), [record("b")]);
    }
}
