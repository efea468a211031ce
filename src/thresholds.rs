use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    error::ConfigRejected,
    sensor::{Metric, RawNumber},
};

const SECONDS_PER_HOUR: f64 = 3600f64;

/// Periods are accepted only strictly inside this open interval, in seconds.
pub const PERIOD_BOUNDS_SECS: (f64, f64) = (10f64, 3600f64);

/// Rate-of-change limits, in metric units per second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SlopeThresholds {
    pub rising: f64,

    pub falling: f64,
}

impl SlopeThresholds {
    pub fn per_hour(rising: f64, falling: f64) -> Self {
        Self {
            rising: rising / SECONDS_PER_HOUR,
            falling: falling / SECONDS_PER_HOUR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComfortThresholds {
    pub inf: f64,

    pub sup: f64,

    pub inf_cutoff: f64,

    pub sup_cutoff: f64,

    pub slope: SlopeThresholds,
}

impl ComfortThresholds {
    pub fn is_ordered(&self) -> bool {
        self.inf < self.inf_cutoff && self.inf_cutoff < self.sup_cutoff && self.sup_cutoff < self.sup
    }

    /// Moves the outer limits and drags the cutoffs along so the hysteresis
    /// margins stay the same width.
    pub fn with_limits(&self, inf: f64, sup: f64) -> Self {
        Self {
            inf,
            sup,
            inf_cutoff: inf + (self.inf_cutoff - self.inf),
            sup_cutoff: sup - (self.sup - self.sup_cutoff),
            slope: self.slope,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Co2Thresholds {
    pub acceptable: f64,

    pub harmful: f64,

    pub danger: f64,

    pub slope: SlopeThresholds,
}

impl Co2Thresholds {
    pub fn is_ordered(&self) -> bool {
        self.acceptable < self.harmful && self.harmful < self.danger
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RequirementThresholds {
    pub temperature: ComfortThresholds,

    pub humidity: ComfortThresholds,

    pub co2: Co2Thresholds,
}

impl Default for RequirementThresholds {
    fn default() -> Self {
        Self {
            temperature: ComfortThresholds {
                inf: 20.0,
                sup: 25.0,
                inf_cutoff: 21.0,
                sup_cutoff: 24.0,
                slope: SlopeThresholds::per_hour(0.5, -0.5),
            },
            humidity: ComfortThresholds {
                inf: 40.0,
                sup: 80.0,
                inf_cutoff: 50.0,
                sup_cutoff: 70.0,
                slope: SlopeThresholds::per_hour(2.0, -2.0),
            },
            co2: Co2Thresholds {
                acceptable: 800.0,
                harmful: 1000.0,
                danger: 1400.0,
                slope: SlopeThresholds::per_hour(100.0, -100.0),
            },
        }
    }
}

impl RequirementThresholds {
    /// Outdoor readings are judged against the indoor comfort limits.
    pub fn comfort(&self, metric: Metric) -> Option<&ComfortThresholds> {
        match metric {
            Metric::Temperature | Metric::TemperatureOuter => Some(&self.temperature),
            Metric::Humidity | Metric::HumidityOuter => Some(&self.humidity),
            Metric::Co2 => None,
        }
    }

    pub fn slope(&self, metric: Metric) -> &SlopeThresholds {
        match self.comfort(metric) {
            Some(c) => &c.slope,
            None => &self.co2.slope,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Periods {
    pub report: Duration,

    pub forecast: Duration,
}

impl Default for Periods {
    fn default() -> Self {
        Self {
            report: Duration::from_secs(600),
            forecast: Duration::from_secs(600),
        }
    }
}

impl Serialize for Periods {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct as _;

        let mut s = serializer.serialize_struct("Periods", 2)?;
        s.serialize_field("report", &self.report.as_secs_f64())?;
        s.serialize_field("forecast", &self.forecast.as_secs_f64())?;
        s.end()
    }
}

pub fn period_from_secs(secs: f64) -> Option<Duration> {
    let (low, high) = PERIOD_BOUNDS_SECS;
    (secs > low && secs < high).then(|| Duration::from_secs_f64(secs))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Settings {
    pub temperature: ComfortThresholds,

    pub humidity: ComfortThresholds,

    pub co2: Co2Thresholds,

    pub period: Periods,
}

impl Settings {
    pub fn new(thresholds: RequirementThresholds, period: Periods) -> Self {
        Self {
            temperature: thresholds.temperature,
            humidity: thresholds.humidity,
            co2: thresholds.co2,
            period,
        }
    }

    pub fn thresholds(&self) -> RequirementThresholds {
        RequirementThresholds {
            temperature: self.temperature,
            humidity: self.humidity,
            co2: self.co2,
        }
    }

    /// Applies every override that passes validation and returns the ones
    /// that did not. Rejected values leave the current setting untouched.
    pub fn apply(&mut self, update: &SettingsUpdate) -> Vec<ConfigRejected> {
        let mut rejected = Vec::new();

        if let Some(limits) = &update.temperature {
            apply_limits(
                &mut self.temperature,
                Metric::Temperature,
                limits,
                ("temperature.inf", "temperature.sup"),
                &mut rejected,
            );
        }

        if let Some(limits) = &update.humidity {
            apply_limits(
                &mut self.humidity,
                Metric::Humidity,
                limits,
                ("humidity.inf", "humidity.sup"),
                &mut rejected,
            );
        }

        if let Some(co2) = &update.co2 {
            apply_co2(&mut self.co2, co2, &mut rejected);
        }

        if let Some(period) = &update.period {
            if let Some(raw) = provided(&period.report) {
                match raw.value().and_then(period_from_secs) {
                    Some(d) => self.period.report = d,
                    None => rejected.push(rejection("period.report", raw)),
                }
            }
            if let Some(raw) = provided(&period.forecast) {
                match raw.value().and_then(period_from_secs) {
                    Some(d) => self.period.forecast = d,
                    None => rejected.push(rejection("period.forecast", raw)),
                }
            }
        }

        rejected
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsUpdate {
    #[serde(default)]
    pub temperature: Option<LimitsUpdate>,

    #[serde(default)]
    pub humidity: Option<LimitsUpdate>,

    #[serde(default)]
    pub co2: Option<Co2Update>,

    #[serde(default)]
    pub period: Option<PeriodUpdate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LimitsUpdate {
    #[serde(default)]
    pub inf: Option<RawNumber>,

    #[serde(default)]
    pub sup: Option<RawNumber>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Co2Update {
    #[serde(default)]
    pub acceptable: Option<RawNumber>,

    #[serde(default)]
    pub harmful: Option<RawNumber>,

    #[serde(default)]
    pub danger: Option<RawNumber>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PeriodUpdate {
    #[serde(default)]
    pub report: Option<RawNumber>,

    #[serde(default)]
    pub forecast: Option<RawNumber>,
}

fn provided(raw: &Option<RawNumber>) -> Option<&RawNumber> {
    raw.as_ref().filter(|r| !r.is_empty())
}

fn rejection(field: &'static str, raw: &RawNumber) -> ConfigRejected {
    let value = match raw {
        RawNumber::Number(v) => v.to_string(),
        RawNumber::Text(s) => s.clone(),
        RawNumber::Other(v) => v.to_string(),
    };

    ConfigRejected { field, value }
}

fn apply_limits(
    current: &mut ComfortThresholds,
    metric: Metric,
    update: &LimitsUpdate,
    fields: (&'static str, &'static str),
    rejected: &mut Vec<ConfigRejected>,
) {
    let mut inf = current.inf;
    let mut sup = current.sup;
    let mut touched = Vec::new();

    if let Some(raw) = provided(&update.inf) {
        match metric.validate(raw.value()) {
            Some(v) => {
                inf = v;
                touched.push((fields.0, raw));
            }
            None => rejected.push(rejection(fields.0, raw)),
        }
    }

    if let Some(raw) = provided(&update.sup) {
        match metric.validate(raw.value()) {
            Some(v) => {
                sup = v;
                touched.push((fields.1, raw));
            }
            None => rejected.push(rejection(fields.1, raw)),
        }
    }

    let candidate = current.with_limits(inf, sup);
    if candidate.is_ordered() {
        *current = candidate;
    } else {
        rejected.extend(touched.into_iter().map(|(f, raw)| rejection(f, raw)));
    }
}

fn apply_co2(current: &mut Co2Thresholds, update: &Co2Update, rejected: &mut Vec<ConfigRejected>) {
    let mut candidate = *current;
    let mut touched = Vec::new();

    for (field, raw, slot) in [
        ("co2.acceptable", &update.acceptable, &mut candidate.acceptable),
        ("co2.harmful", &update.harmful, &mut candidate.harmful),
        ("co2.danger", &update.danger, &mut candidate.danger),
    ] {
        let Some(raw) = provided(raw) else {
            continue;
        };

        match Metric::Co2.validate(raw.value()) {
            Some(v) => {
                *slot = v;
                touched.push((field, raw));
            }
            None => rejected.push(rejection(field, raw)),
        }
    }

    if candidate.is_ordered() {
        *current = candidate;
    } else {
        rejected.extend(touched.into_iter().map(|(f, raw)| rejection(f, raw)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings::new(RequirementThresholds::default(), Periods::default())
    }

    fn update(json: &str) -> SettingsUpdate {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn defaults_are_ordered() {
        let t = RequirementThresholds::default();
        assert!(t.temperature.is_ordered());
        assert!(t.humidity.is_ordered());
        assert!(t.co2.is_ordered());
    }

    #[test]
    fn valid_overrides_apply_and_keep_hysteresis_margins() {
        let mut s = settings();
        let rejected = s.apply(&update(
            r#"{"temperature": {"inf": "18", "sup": 26}, "period": {"report": 300, "forecast": "900"}}"#,
        ));

        assert!(rejected.is_empty(), "{rejected:?}");
        assert_eq!(s.temperature.inf, 18.0);
        assert_eq!(s.temperature.inf_cutoff, 19.0);
        assert_eq!(s.temperature.sup_cutoff, 25.0);
        assert_eq!(s.temperature.sup, 26.0);
        assert_eq!(s.period.report, Duration::from_secs(300));
        assert_eq!(s.period.forecast, Duration::from_secs(900));
    }

    #[test]
    fn out_of_range_values_are_ignored() {
        let mut s = settings();
        let rejected = s.apply(&update(
            r#"{"temperature": {"inf": 150}, "co2": {"danger": -5}, "period": {"report": 10, "forecast": 3600}}"#,
        ));

        let fields: Vec<_> = rejected.iter().map(|r| r.field).collect();
        assert_eq!(
            fields,
            ["temperature.inf", "co2.danger", "period.report", "period.forecast"]
        );
        assert_eq!(s, settings());
    }

    #[test]
    fn overrides_that_break_ordering_are_ignored() {
        let mut s = settings();
        let rejected = s.apply(&update(r#"{"co2": {"harmful": 1500}, "humidity": {"inf": 75}}"#));

        assert_eq!(rejected.len(), 2);
        assert_eq!(s, settings());
    }

    #[test]
    fn blank_fields_are_not_updates() {
        let mut s = settings();
        let rejected = s.apply(&update(
            r#"{"temperature": {"inf": "", "sup": ""}, "co2": {"acceptable": "", "harmful": "", "danger": "1500"}}"#,
        ));

        assert!(rejected.is_empty());
        assert_eq!(s.co2.danger, 1500.0);
        assert_eq!(s.temperature, settings().temperature);
    }

    #[test]
    fn period_bounds_are_exclusive() {
        assert_eq!(period_from_secs(10.0), None);
        assert_eq!(period_from_secs(3600.0), None);
        assert_eq!(period_from_secs(10.5), Some(Duration::from_secs_f64(10.5)));
        assert_eq!(period_from_secs(3599.0), Some(Duration::from_secs(3599)));
    }

    #[test]
    fn settings_serialize_in_the_form_the_web_ui_reads() {
        let json = serde_json::to_value(settings()).unwrap();
        assert_eq!(json["temperature"]["inf"], 20.0);
        assert_eq!(json["co2"]["danger"], 1400.0);
        assert_eq!(json["period"]["report"], 600.0);
    }
}
