use crate::{error::InsufficientData, sensor::Sample};

/// Ordinary least-squares slope of value against time, in units per second.
pub fn trend(samples: &[Sample]) -> Result<f64, InsufficientData> {
    let Some(first) = samples.first() else {
        return Err(InsufficientData);
    };

    // Offsets from the first timestamp keep the sums small.
    let points: Vec<(f64, f64)> = samples
        .iter()
        .map(|s| (s.seconds_since(first.timestamp), s.value))
        .collect();

    slope(&points)
}

pub fn slope(points: &[(f64, f64)]) -> Result<f64, InsufficientData> {
    if points.len() < 2 {
        return Err(InsufficientData);
    }

    let n = points.len() as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (sxy, sxx) = points.iter().fold((0f64, 0f64), |(sxy, sxx), (x, y)| {
        let dx = x - mean_x;
        (sxy + dx * (y - mean_y), sxx + dx * dx)
    });

    if sxx == 0f64 {
        return Err(InsufficientData);
    }

    Ok(sxy / sxx)
}
