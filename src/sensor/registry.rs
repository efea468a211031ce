use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::sensor::{Metric, RawNumber, Sample, SensorProfile, SensorRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestResult {
    AuthRequired,
    AuthRejected,
    BadRequest,
    Accepted,
}

/// What the registry decided about one incoming reading.
#[derive(Debug, Clone, PartialEq)]
pub enum Admission {
    Refused(IngestResult),

    /// Authenticated and well-formed, but the value failed validation. The
    /// caller still answers `Accepted`.
    Dropped { sensor_id: String, metric: Metric },

    Store(Sample),
}

impl Admission {
    pub fn result(&self) -> IngestResult {
        match self {
            Admission::Refused(r) => *r,
            Admission::Dropped { .. } | Admission::Store(_) => IngestResult::Accepted,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SensorRegistry {
    sensors: BTreeMap<Metric, SensorProfile>,
}

impl SensorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, profile: SensorProfile) {
        self.sensors.insert(profile.metric, profile);
    }

    pub fn get(&self, metric: Metric) -> Option<&SensorProfile> {
        self.sensors.get(&metric)
    }

    pub fn profiles(&self) -> impl Iterator<Item = &SensorProfile> {
        self.sensors.values()
    }

    pub fn authenticate(&self, token: &str) -> Option<&SensorProfile> {
        if token.is_empty() {
            return None;
        }

        self.sensors
            .values()
            .find(|p| p.token.as_deref() == Some(token))
    }

    /// Replaces the token of the sensor reporting `metric`, creating the
    /// sensor on first use. Returns the updated profile, or `None` when the
    /// token is empty or already held by another sensor.
    pub fn rotate_token(&mut self, metric: Metric, token: &str) -> Option<&SensorProfile> {
        if token.is_empty() {
            return None;
        }

        if let Some(holder) = self.authenticate(token)
            && holder.metric != metric
        {
            warn!(sensor = %metric, holder = %holder.id, "refusing token already held by another sensor");
            return None;
        }

        let profile = self
            .sensors
            .entry(metric)
            .or_insert_with(|| SensorProfile::new(metric, None));
        profile.token = Some(token.to_owned());

        Some(profile)
    }

    pub fn revoke(&mut self, metric: Metric) -> Option<&SensorProfile> {
        let profile = self.sensors.get_mut(&metric)?;
        profile.token = None;

        Some(profile)
    }

    /// Applies persisted registry rows over the configured profiles. Rows
    /// with an unknown pragma are skipped.
    pub fn restore(&mut self, records: &[SensorRecord]) {
        for record in records {
            let Ok(metric) = record.pragma.parse::<Metric>() else {
                warn!(name = %record.name, pragma = %record.pragma, "skipping sensor record with unknown pragma");
                continue;
            };

            let profile = self
                .sensors
                .entry(metric)
                .or_insert_with(|| SensorProfile::new(metric, None));
            profile.token = Some(record.token.clone()).filter(|t| !t.is_empty());
        }
    }

    pub fn admit(
        &self,
        token: Option<&str>,
        raw: Option<&RawNumber>,
        now: DateTime<Utc>,
    ) -> Admission {
        let token = match token {
            Some(t) if !t.is_empty() => t,
            _ => return Admission::Refused(IngestResult::AuthRequired),
        };

        let Some(profile) = self.authenticate(token) else {
            return Admission::Refused(IngestResult::AuthRejected);
        };

        let raw = match raw {
            Some(r) if !r.is_empty() => r,
            _ => return Admission::Refused(IngestResult::BadRequest),
        };

        match profile.validate(raw.value()) {
            Some(value) => Admission::Store(Sample {
                sensor_id: profile.id.clone(),
                metric: profile.metric,
                value,
                timestamp: now,
            }),
            None => Admission::Dropped {
                sensor_id: profile.id.clone(),
                metric: profile.metric,
            },
        }
    }
}
