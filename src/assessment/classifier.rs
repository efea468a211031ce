use crate::{
    assessment::{Band, Co2Band, ComfortBand, TrendBand},
    sensor::Metric,
    thresholds::{Co2Thresholds, ComfortThresholds, RequirementThresholds, SlopeThresholds},
};

pub fn classify_comfort(value: f64, t: &ComfortThresholds) -> ComfortBand {
    if value > t.sup {
        ComfortBand::TooHigh
    } else if value > t.sup_cutoff {
        ComfortBand::SupBorder
    } else if value >= t.inf_cutoff {
        ComfortBand::Optimum
    } else if value >= t.inf {
        ComfortBand::InfBorder
    } else {
        ComfortBand::TooLow
    }
}

/// Starts at the worst band and downgrades once per boundary the value is
/// below. Each check is narrower than the previous one, so the last match wins.
pub fn classify_co2(value: f64, t: &Co2Thresholds) -> Co2Band {
    let mut band = Co2Band::Danger;
    if value < t.danger {
        band = Co2Band::Harmful;
    }
    if value < t.harmful {
        band = Co2Band::Acceptable;
    }
    if value < t.acceptable {
        band = Co2Band::Optimum;
    }

    band
}

pub fn classify(metric: Metric, value: f64, thresholds: &RequirementThresholds) -> Band {
    match thresholds.comfort(metric) {
        Some(comfort) => Band::Comfort(classify_comfort(value, comfort)),
        None => Band::Co2(classify_co2(value, &thresholds.co2)),
    }
}

pub fn classify_trend(slope: f64, t: &SlopeThresholds) -> TrendBand {
    if slope > t.rising {
        TrendBand::Rising
    } else if slope < t.falling {
        TrendBand::Falling
    } else {
        TrendBand::Constant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temperature() -> ComfortThresholds {
        RequirementThresholds::default().temperature
    }

    #[test]
    fn comfort_boundaries() {
        let t = temperature();
        assert_eq!(classify_comfort(16.0, &t), ComfortBand::TooLow);
        assert_eq!(classify_comfort(19.99, &t), ComfortBand::TooLow);
        assert_eq!(classify_comfort(20.0, &t), ComfortBand::InfBorder);
        assert_eq!(classify_comfort(20.5, &t), ComfortBand::InfBorder);
        assert_eq!(classify_comfort(21.0, &t), ComfortBand::Optimum);
        assert_eq!(classify_comfort(22.5, &t), ComfortBand::Optimum);
        assert_eq!(classify_comfort(24.0, &t), ComfortBand::Optimum);
        assert_eq!(classify_comfort(24.01, &t), ComfortBand::SupBorder);
        assert_eq!(classify_comfort(25.0, &t), ComfortBand::SupBorder);
        assert_eq!(classify_comfort(25.01, &t), ComfortBand::TooHigh);
    }

    #[test]
    fn comfort_bands_partition_the_line_monotonically() {
        let t = temperature();
        let rank = |b: ComfortBand| match b {
            ComfortBand::TooLow => 0,
            ComfortBand::InfBorder => 1,
            ComfortBand::Optimum => 2,
            ComfortBand::SupBorder => 3,
            ComfortBand::TooHigh => 4,
        };

        let mut previous = rank(classify_comfort(-60.0, &t));
        let mut value = -60.0;
        while value < 100.0 {
            let current = rank(classify_comfort(value, &t));
            assert!(current >= previous, "band went backwards at {value}");
            assert!(current - previous <= 1, "band skipped at {value}");
            previous = current;
            value += 0.01;
        }
        assert_eq!(previous, 4);
    }

    #[test]
    fn co2_ladder() {
        let t = RequirementThresholds::default().co2;
        let eps = 1e-6;
        assert_eq!(classify_co2(t.danger - eps, &t), Co2Band::Harmful);
        assert_eq!(classify_co2(t.acceptable - eps, &t), Co2Band::Optimum);
        assert_eq!(classify_co2(t.danger + 1.0, &t), Co2Band::Danger);
        assert_eq!(classify_co2(t.danger, &t), Co2Band::Danger);
        assert_eq!(classify_co2(t.harmful, &t), Co2Band::Harmful);
        assert_eq!(classify_co2(t.acceptable, &t), Co2Band::Acceptable);
        assert_eq!(classify_co2(400.0, &t), Co2Band::Optimum);
    }

    #[test]
    fn outdoor_metrics_use_indoor_limits() {
        let t = RequirementThresholds::default();
        assert_eq!(
            classify(Metric::TemperatureOuter, 17.0, &t),
            Band::Comfort(ComfortBand::TooLow)
        );
        assert_eq!(
            classify(Metric::HumidityOuter, 60.0, &t),
            Band::Comfort(ComfortBand::Optimum)
        );
        assert_eq!(classify(Metric::Co2, 1200.0, &t), Band::Co2(Co2Band::Harmful));
    }

    #[test]
    fn trend_partition() {
        let s = SlopeThresholds {
            rising: 0.01,
            falling: -0.01,
        };
        assert_eq!(classify_trend(0.0, &s), TrendBand::Constant);
        assert_eq!(classify_trend(0.01, &s), TrendBand::Constant);
        assert_eq!(classify_trend(-0.01, &s), TrendBand::Constant);
        assert_eq!(classify_trend(0.02, &s), TrendBand::Rising);
        assert_eq!(classify_trend(-0.02, &s), TrendBand::Falling);
    }
}
