use std::{collections::BTreeMap, time::Duration};

use anyhow::{Context as _, Result, anyhow};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Serialize, Serializer};

use crate::{
    actuator::ActuatorKind,
    assessment::{Band, TrendBand, classify, classify_trend, forecast, trend},
    sensor::{Metric, Sample, average},
    store::TimeSeriesStore,
    thresholds::RequirementThresholds,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricReport {
    pub value: f64,

    pub band: Band,

    pub trend_slope: Option<f64>,

    pub trend_band: Option<TrendBand>,

    pub forecast_value: Option<f64>,

    pub forecast_band: Option<Band>,
}

impl MetricReport {
    /// `None` when the window is empty. A window too thin for a trend still
    /// yields a report, with the trend and forecast fields left empty.
    pub fn assess(
        metric: Metric,
        samples: &[Sample],
        thresholds: &RequirementThresholds,
        horizon: Duration,
    ) -> Option<Self> {
        let value = average(samples)?;
        let trend_slope = trend(samples).ok();
        let forecast_value = trend_slope.map(|slope| forecast(value, slope, horizon));

        Some(Self {
            value,
            band: classify(metric, value, thresholds),
            trend_slope,
            trend_band: trend_slope.map(|s| classify_trend(s, thresholds.slope(metric))),
            forecast_value,
            forecast_band: forecast_value.map(|v| classify(metric, v, thresholds)),
        })
    }

    /// The forecast band when a forecast exists, otherwise the current band.
    pub fn expected_band(&self) -> Band {
        self.forecast_band.unwrap_or(self.band)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub for_moment: DateTime<Utc>,

    #[serde(serialize_with = "serialize_secs")]
    pub for_period: Duration,

    pub per_metric: BTreeMap<Metric, MetricReport>,

    pub device_power_states: BTreeMap<ActuatorKind, bool>,
}

impl Report {
    /// Builds a report only if every metric has at least one sample.
    pub fn assemble(
        for_moment: DateTime<Utc>,
        for_period: Duration,
        windows: &BTreeMap<Metric, Vec<Sample>>,
        thresholds: &RequirementThresholds,
        horizon: Duration,
        device_power_states: BTreeMap<ActuatorKind, bool>,
    ) -> Option<Self> {
        let mut per_metric = BTreeMap::new();
        for metric in Metric::ALL {
            let samples = windows.get(&metric)?;
            per_metric.insert(
                metric,
                MetricReport::assess(metric, samples, thresholds, horizon)?,
            );
        }

        Some(Self {
            for_moment,
            for_period,
            per_metric,
            device_power_states,
        })
    }

    pub fn metric(&self, metric: Metric) -> Option<&MetricReport> {
        self.per_metric.get(&metric)
    }
}

fn serialize_secs<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(d.as_secs_f64())
}

pub struct ReportBuilder<'a> {
    pub store: &'a dyn TimeSeriesStore,

    pub thresholds: &'a RequirementThresholds,

    pub horizon: Duration,

    pub query_timeout: Duration,
}

impl ReportBuilder<'_> {
    /// Pulls the trailing `period` of every metric ending at `now`. Store
    /// failures are errors; missing data is `Ok(None)`.
    pub async fn build(
        &self,
        now: DateTime<Utc>,
        period: Duration,
        device_power_states: BTreeMap<ActuatorKind, bool>,
    ) -> Result<Option<Report>> {
        let windows = fetch_windows(self.store, now, period, self.query_timeout).await?;

        Ok(Report::assemble(
            now,
            period,
            &windows,
            self.thresholds,
            self.horizon,
            device_power_states,
        ))
    }
}

/// Every metric's samples in the trailing `period` ending at `now`. Each
/// query is bounded by `query_timeout`.
pub async fn fetch_windows(
    store: &dyn TimeSeriesStore,
    now: DateTime<Utc>,
    period: Duration,
    query_timeout: Duration,
) -> Result<BTreeMap<Metric, Vec<Sample>>> {
    let begin = TimeDelta::from_std(period)
        .ok()
        .and_then(|span| now.checked_sub_signed(span))
        .ok_or_else(|| anyhow!("period out of range: {period:?}"))?;

    let mut windows = BTreeMap::new();
    for metric in Metric::ALL {
        let samples = tokio::time::timeout(query_timeout, store.window(metric, begin, now))
            .await
            .map_err(|_| anyhow!("timed out querying {metric} window"))?
            .with_context(|| format!("failed to query {metric} window"))?;
        windows.insert(metric, samples);
    }

    Ok(windows)
}
