//! Additive seasonal decomposition of a monthly series

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::models::{ClimateDataset, ClimateVariable};
use crate::{ClimateError, Result};

/// Months per seasonal cycle
pub const SEASONAL_PERIOD: usize = 12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecompositionPoint {
    pub year: i32,
    pub month: u32,
    pub observed: f64,
    /// Undefined for the first and last half period
    pub trend: Option<f64>,
    pub seasonal: f64,
    pub residual: Option<f64>,
}

/// `observed = trend + seasonal + residual` wherever the trend is defined
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decomposition {
    pub variable: ClimateVariable,
    pub period: usize,
    pub points: Vec<DecompositionPoint>,
}

impl Decomposition {
    pub fn trend(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.trend).collect()
    }

    pub fn seasonal(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.seasonal).collect()
    }

    pub fn residual(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.residual).collect()
    }
}

/// Split `variable` into trend, a fixed 12-month seasonal profile and residual.
///
/// Needs at least two full cycles of consecutive months.
#[instrument(level = "debug", skip(dataset))]
pub fn decompose(dataset: &ClimateDataset, variable: ClimateVariable) -> Result<Decomposition> {
    if dataset.is_empty() {
        return Err(ClimateError::empty_dataset("cannot decompose an empty dataset"));
    }

    let records = dataset.records();
    if records.len() < 2 * SEASONAL_PERIOD {
        return Err(ClimateError::insufficient_data(format!(
            "decomposition needs at least {} consecutive months, got {}",
            2 * SEASONAL_PERIOD,
            records.len()
        )));
    }
    if let Some(pair) = records
        .windows(2)
        .find(|pair| pair[1].month_index() != pair[0].month_index() + 1)
    {
        return Err(ClimateError::insufficient_data(format!(
            "series has a gap between {}-{:02} and {}-{:02}",
            pair[0].year, pair[0].month, pair[1].year, pair[1].month
        )));
    }

    let observed: Vec<f64> = records.iter().map(|r| r.value(variable)).collect();
    let trend = centered_moving_average(&observed, SEASONAL_PERIOD);
    let profile = seasonal_profile(&observed, &trend, SEASONAL_PERIOD);

    let points = records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let seasonal = profile[i % SEASONAL_PERIOD];
            DecompositionPoint {
                year: record.year,
                month: record.month,
                observed: observed[i],
                trend: trend[i],
                seasonal,
                residual: trend[i].map(|t| observed[i] - t - seasonal),
            }
        })
        .collect();

    debug!("Decomposed {} into {} points", variable, observed.len());
    Ok(Decomposition {
        variable,
        period: SEASONAL_PERIOD,
        points,
    })
}

/// Centered moving average; an even period uses a 2×period window with
/// half weights at both ends.
fn centered_moving_average(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let half = period / 2;
    let weights: Vec<f64> = if period % 2 == 0 {
        (0..=period)
            .map(|k| if k == 0 || k == period { 0.5 } else { 1.0 })
            .map(|w| w / period as f64)
            .collect()
    } else {
        vec![1.0 / period as f64; period]
    };

    (0..values.len())
        .map(|i| {
            if i < half || i + half >= values.len() {
                return None;
            }
            let window = &values[i - half..i - half + weights.len()];
            Some(window.iter().zip(&weights).map(|(v, w)| v * w).sum())
        })
        .collect()
}

/// Mean detrended value per cycle position, shifted to sum to zero
fn seasonal_profile(observed: &[f64], trend: &[Option<f64>], period: usize) -> Vec<f64> {
    let mut sums = vec![0.0; period];
    let mut counts = vec![0usize; period];
    for (i, (value, trend)) in observed.iter().zip(trend).enumerate() {
        if let Some(trend) = trend {
            sums[i % period] += value - trend;
            counts[i % period] += 1;
        }
    }

    let averages: Vec<f64> = sums
        .iter()
        .zip(&counts)
        .map(|(sum, &count)| if count == 0 { 0.0 } else { sum / count as f64 })
        .collect();
    let offset = averages.iter().sum::<f64>() / period as f64;
    averages.into_iter().map(|a| a - offset).collect()
}

/// Seasonal component keyed by calendar month
#[must_use]
pub fn monthly_seasonal_pattern(decomposition: &Decomposition) -> BTreeMap<u32, f64> {
    let mut pattern: BTreeMap<u32, (f64, usize)> = BTreeMap::new();
    for point in &decomposition.points {
        let entry = pattern.entry(point.month).or_insert((0.0, 0));
        entry.0 += point.seasonal;
        entry.1 += 1;
    }
    pattern
        .into_iter()
        .map(|(month, (sum, count))| (month, sum / count as f64))
        .collect()
}
