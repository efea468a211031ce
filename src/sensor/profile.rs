use serde::{Deserialize, Serialize};

use crate::sensor::{Metric, ValidRange};

#[derive(Debug, Clone)]
pub struct SensorProfile {
    pub id: String,

    pub token: Option<String>,

    pub metric: Metric,

    pub valid_range: ValidRange,
}

impl SensorProfile {
    pub fn new(metric: Metric, token: Option<String>) -> Self {
        Self {
            id: metric.as_str().to_owned(),
            token: token.filter(|t| !t.is_empty()),
            metric,
            valid_range: metric.valid_range(),
        }
    }

    pub fn validate(&self, value: Option<f64>) -> Option<f64> {
        value.filter(|v| self.valid_range.contains(*v))
    }
}

/// Row of the persisted sensor registry: `{name, token, pragma}`, where the
/// pragma names the metric the sensor reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SensorRecord {
    pub name: String,

    pub token: String,

    pub pragma: String,
}

impl From<&SensorProfile> for SensorRecord {
    fn from(profile: &SensorProfile) -> Self {
        Self {
            name: profile.id.clone(),
            token: profile.token.clone().unwrap_or_default(),
            pragma: profile.metric.as_str().to_owned(),
        }
    }
}
