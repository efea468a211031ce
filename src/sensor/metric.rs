use std::{fmt, str::FromStr};

use anyhow::{Error, bail};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Temperature,
    Humidity,
    Co2,
    TemperatureOuter,
    HumidityOuter,
}

/// Half-open `[min, max)` interval of physically plausible readings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidRange {
    pub min: f64,

    pub max: f64,
}

impl ValidRange {
    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && self.min <= value && value < self.max
    }
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::Temperature,
        Metric::Humidity,
        Metric::Co2,
        Metric::TemperatureOuter,
        Metric::HumidityOuter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Temperature => "temperature",
            Metric::Humidity => "humidity",
            Metric::Co2 => "co2",
            Metric::TemperatureOuter => "temperature_outer",
            Metric::HumidityOuter => "humidity_outer",
        }
    }

    pub fn valid_range(&self) -> ValidRange {
        match self {
            Metric::Temperature | Metric::TemperatureOuter => ValidRange {
                min: -60.0,
                max: 100.0,
            },
            Metric::Humidity | Metric::HumidityOuter => ValidRange {
                min: 0.0,
                max: 100.0,
            },
            Metric::Co2 => ValidRange {
                min: 0.0,
                max: 10_000.0,
            },
        }
    }

    pub fn validate(&self, value: Option<f64>) -> Option<f64> {
        value.filter(|v| self.valid_range().contains(*v))
    }

    /// Name of the per-metric sample collection in the time-series store.
    pub fn collection(&self) -> &'static str {
        match self {
            Metric::Temperature => "temperature_samples",
            Metric::Humidity => "humidity_samples",
            Metric::Co2 => "co2_samples",
            Metric::TemperatureOuter => "temperature_outer_samples",
            Metric::HumidityOuter => "humidity_outer_samples",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "temperature" => Ok(Metric::Temperature),
            "humidity" => Ok(Metric::Humidity),
            "co2" => Ok(Metric::Co2),
            "temperature_outer" => Ok(Metric::TemperatureOuter),
            "humidity_outer" => Ok(Metric::HumidityOuter),
            _ => bail!("unknown metric: {}", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_metric_name() {
        for metric in Metric::ALL {
            assert_eq!(metric.as_str().parse::<Metric>().unwrap(), metric);
        }
        assert!("pressure".parse::<Metric>().is_err());
    }

    #[test]
    fn valid_range_is_half_open() {
        let range = Metric::Temperature.valid_range();
        assert!(range.contains(-60.0));
        assert!(range.contains(99.9));
        assert!(!range.contains(100.0));
        assert!(!range.contains(150.0));
        assert!(!range.contains(f64::NAN));
    }

    #[test]
    fn validate_rejects_missing_values() {
        assert_eq!(Metric::Co2.validate(None), None);
        assert_eq!(Metric::Co2.validate(Some(650.0)), Some(650.0));
        assert_eq!(Metric::Co2.validate(Some(-1.0)), None);
    }
}
