use std::time::Duration;

/// Extrapolates from the window average rather than the latest reading, which
/// smooths out single noisy samples.
pub fn forecast(average: f64, slope: f64, horizon: Duration) -> f64 {
    average + slope * horizon.as_secs_f64()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_slope_returns_average() {
        for secs in [0, 1, 600, 3599, 86_400] {
            assert_eq!(forecast(22.4, 0.0, Duration::from_secs(secs)), 22.4);
        }
    }

    #[test]
    fn extrapolates_linearly() {
        assert!((forecast(20.0, 0.01, Duration::from_secs(600)) - 26.0).abs() < 1e-9);
        assert!((forecast(900.0, -0.5, Duration::from_secs(60)) - 870.0).abs() < 1e-9);
        assert_eq!(forecast(16.0, 0.25, Duration::ZERO), 16.0);
    }
}
