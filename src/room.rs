mod devices;

pub use devices::*;

use std::{collections::BTreeMap, sync::Arc, time::Duration};

use anyhow::{Context as _, Result, anyhow};
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::{
    actuator::{ActuatorGateway, ActuatorKind, ActuatorProfile, ActuatorTransport},
    autocontrol::{Decision, DecisionInputs, decide, dispatch},
    config::RoomConfig,
    error::ConfigRejected,
    report::{Report, ReportBuilder, fetch_windows},
    sensor::{
        Admission, IngestResult, Metric, RawNumber, Sample, SensorProfile, SensorRecord,
        SensorRegistry,
    },
    store::TimeSeriesStore,
    thresholds::{Settings, SettingsUpdate, period_from_secs},
};

/// State that only changes inside the per-room critical section: one report
/// build and the autocontrol pass that follows it run under one lock.
#[derive(Debug)]
struct ControlState {
    settings: Settings,
    actuators: BTreeMap<ActuatorKind, ActuatorProfile>,
    report: Option<Report>,
}

pub struct Room {
    name: String,
    registry: RwLock<SensorRegistry>,
    control: Mutex<ControlState>,
    store: Arc<dyn TimeSeriesStore>,
    gateway: ActuatorGateway,
    store_timeout: Duration,
}

impl Room {
    pub fn new(
        config: RoomConfig,
        store: Arc<dyn TimeSeriesStore>,
        transport: Arc<dyn ActuatorTransport>,
    ) -> Self {
        let mut registry = SensorRegistry::new();
        for metric in Metric::ALL {
            let token = config.sensor_tokens.get(&metric).cloned();
            registry.register(SensorProfile::new(metric, token));
        }

        let actuators = config
            .actuators
            .into_iter()
            .map(|a| (a.kind, a))
            .collect();

        info!(room = %config.name, "created room");

        Self {
            name: config.name,
            registry: RwLock::new(registry),
            control: Mutex::new(ControlState {
                settings: Settings::new(config.thresholds, config.periods),
                actuators,
                report: None,
            }),
            gateway: ActuatorGateway::new(transport, store.clone(), config.store_timeout),
            store,
            store_timeout: config.store_timeout,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Loads persisted sensor tokens over the configured ones, then writes
    /// back any sensor the store did not know about.
    pub async fn sync_sensors(&self) -> Result<()> {
        let records = self
            .bounded(self.store.sensors())
            .await
            .context("failed to load sensor registry")?;

        let mut registry = self.registry.write().await;
        registry.restore(&records);

        for profile in registry.profiles() {
            if records.iter().any(|r| r.name == profile.id) {
                continue;
            }
            self.bounded(self.store.upsert_sensor(&SensorRecord::from(profile)))
                .await
                .with_context(|| format!("failed to persist sensor {}", profile.id))?;
        }

        Ok(())
    }

    pub async fn ingest(&self, token: Option<&str>, raw: Option<&RawNumber>) -> IngestResult {
        self.ingest_at(token, raw, Utc::now()).await
    }

    /// Authenticates and stores one reading. Only the append happens here;
    /// the caller runs [`Room::evaluate`] afterwards so the decision sees the
    /// new sample.
    pub async fn ingest_at(
        &self,
        token: Option<&str>,
        raw: Option<&RawNumber>,
        now: DateTime<Utc>,
    ) -> IngestResult {
        let admission = self.registry.read().await.admit(token, raw, now);

        match &admission {
            Admission::Refused(result) => debug!(?result, "refused reading"),
            Admission::Dropped { sensor_id, metric } => {
                warn!(sensor = %sensor_id, %metric, ?raw, "dropping invalid reading");
            }
            Admission::Store(sample) => match self.bounded(self.store.append(sample)).await {
                Ok(()) => debug!(sensor = %sample.sensor_id, value = sample.value, "stored sample"),
                Err(e) => error!(sensor = %sample.sensor_id, "failed to store sample: {e:#}"),
            },
        }

        admission.result()
    }

    pub async fn evaluate(&self) -> Option<Decision> {
        self.evaluate_at(Utc::now()).await
    }

    /// Rebuilds the current report over the configured window and, when one
    /// could be built, runs the decision table and dispatches its result.
    pub async fn evaluate_at(&self, now: DateTime<Utc>) -> Option<Decision> {
        let mut control = self.control.lock().await;

        let period = control.settings.period.report;
        let report = self.build_report(&control, now, period).await;
        control.report = report.clone();

        let inputs = report.as_ref().and_then(DecisionInputs::from_report)?;
        let decision = decide(&inputs);
        info!(room = %self.name, ?decision, "autocontrol decision");

        dispatch(&decision, &mut control.actuators, &self.gateway).await;

        Some(decision)
    }

    /// Builds a report for `period` (the configured report window when absent
    /// or out of bounds) and makes it the current one.
    pub async fn make_report(&self, period: Option<f64>) -> Option<Report> {
        self.make_report_at(period, Utc::now()).await
    }

    pub async fn make_report_at(&self, period: Option<f64>, now: DateTime<Utc>) -> Option<Report> {
        let mut control = self.control.lock().await;

        let period = period
            .and_then(period_from_secs)
            .unwrap_or(control.settings.period.report);
        let report = self.build_report(&control, now, period).await;
        control.report = report.clone();

        report
    }

    pub async fn current_report(&self) -> Option<Report> {
        self.control.lock().await.report.clone()
    }

    pub async fn settings(&self) -> Settings {
        self.control.lock().await.settings
    }

    pub async fn update_settings(&self, update: &SettingsUpdate) -> Vec<ConfigRejected> {
        let mut control = self.control.lock().await;

        let rejected = control.settings.apply(update);
        for r in &rejected {
            warn!(room = %self.name, field = r.field, value = %r.value, "ignoring setting");
        }

        rejected
    }

    pub async fn device_status(&self) -> DeviceStatus {
        DeviceStatus::collect(self.control.lock().await.actuators.values())
    }

    /// Applies a device settings form. Address and token changes land first
    /// so that commands in the same update reach the new endpoint. This is
    /// the only path that switches a device off.
    pub async fn update_devices(&self, update: &DeviceSettingsUpdate) {
        {
            let mut control = self.control.lock().await;

            for (kind, address) in &update.executor_address {
                if let Some(a) = control.actuators.get_mut(kind) {
                    a.address = address.clone();
                }
            }
            for (kind, token) in &update.executor_token {
                if let Some(a) = control.actuators.get_mut(kind) {
                    a.token = token.clone();
                }
            }
            for (kind, enabled) in &update.executor_autocontrol {
                if let Some(a) = control.actuators.get_mut(kind) {
                    a.autocontrol_enabled = *enabled;
                }
            }
            for (kind, setting) in &update.executor_setting {
                if let Some(a) = control.actuators.get_mut(kind) {
                    self.gateway.apply_setting(a, setting.clone()).await;
                }
            }
            for (kind, on) in &update.executor_on {
                if let Some(a) = control.actuators.get_mut(kind) {
                    self.gateway.switch_power(a, *on).await;
                }
            }
        }

        let mut changed = Vec::new();
        {
            let mut registry = self.registry.write().await;

            for (metric, remove) in &update.sensor_remove {
                if *remove && let Some(p) = registry.revoke(*metric) {
                    info!(sensor = %p.id, "revoked sensor token");
                    changed.push(SensorRecord::from(p));
                }
            }
            for (metric, token) in &update.sensor_new_token {
                if let Some(p) = registry.rotate_token(*metric, token) {
                    info!(sensor = %p.id, "rotated sensor token");
                    changed.push(SensorRecord::from(p));
                }
            }
        }

        for record in changed {
            if let Err(e) = self.bounded(self.store.upsert_sensor(&record)).await {
                error!(sensor = %record.name, "failed to persist sensor token: {e:#}");
            }
        }
    }

    /// Raw samples of every metric over the trailing `period` seconds.
    pub async fn data(&self, period: f64) -> Result<BTreeMap<Metric, Vec<Sample>>> {
        let period = Duration::try_from_secs_f64(period)
            .map_err(|_| anyhow!("invalid period: {period}"))?;

        fetch_windows(self.store.as_ref(), Utc::now(), period, self.store_timeout).await
    }

    async fn build_report(
        &self,
        control: &ControlState,
        now: DateTime<Utc>,
        period: Duration,
    ) -> Option<Report> {
        let thresholds = control.settings.thresholds();
        let builder = ReportBuilder {
            store: self.store.as_ref(),
            thresholds: &thresholds,
            horizon: control.settings.period.forecast,
            query_timeout: self.store_timeout,
        };
        let power_states = control
            .actuators
            .iter()
            .map(|(kind, a)| (*kind, a.power_state))
            .collect();

        match builder.build(now, period, power_states).await {
            Ok(Some(report)) => Some(report),
            Ok(None) => {
                info!(room = %self.name, "not enough data for a report");
                None
            }
            Err(e) => {
                error!(room = %self.name, "failed to build report: {e:#}");
                None
            }
        }
    }

    async fn bounded<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::time::timeout(self.store_timeout, fut)
            .await
            .map_err(|_| anyhow!("store call timed out after {:?}", self.store_timeout))?
    }
}
