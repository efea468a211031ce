use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::sensor::Metric;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    pub sensor_id: String,

    #[serde(skip)]
    pub metric: Metric,

    pub value: f64,

    #[serde(rename = "date")]
    pub timestamp: DateTime<Utc>,
}

impl Sample {
    pub fn seconds_since(&self, origin: DateTime<Utc>) -> f64 {
        (self.timestamp - origin).num_milliseconds() as f64 / 1000f64
    }
}

pub fn average(samples: &[Sample]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }

    Some(samples.iter().map(|s| s.value).sum::<f64>() / samples.len() as f64)
}
