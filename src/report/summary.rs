//! Descriptive statistics and annual aggregates

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{ClimateDataset, ClimateVariable};
use crate::{ClimateError, Result};

/// Mean of every variable over the months recorded in one year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualAggregate {
    pub year: i32,
    /// Number of monthly records that went into the means
    pub months: usize,
    pub average_temperature: f64,
    pub max_temperature: f64,
    pub min_temperature: f64,
    pub total_rainfall: f64,
}

impl AnnualAggregate {
    pub fn value(&self, variable: ClimateVariable) -> f64 {
        match variable {
            ClimateVariable::AverageTemperature => self.average_temperature,
            ClimateVariable::MaxTemperature => self.max_temperature,
            ClimateVariable::MinTemperature => self.min_temperature,
            ClimateVariable::TotalRainfall => self.total_rainfall,
        }
    }
}

/// Per-year means, ascending by year
#[must_use]
pub fn annual_aggregates(dataset: &ClimateDataset) -> Vec<AnnualAggregate> {
    let mut by_year: BTreeMap<i32, (usize, [f64; 4])> = BTreeMap::new();
    for record in dataset {
        let entry = by_year.entry(record.year).or_insert((0, [0.0; 4]));
        entry.0 += 1;
        entry.1[0] += record.average_temperature;
        entry.1[1] += record.max_temperature;
        entry.1[2] += record.min_temperature;
        entry.1[3] += record.total_rainfall;
    }

    by_year
        .into_iter()
        .map(|(year, (months, sums))| {
            let n = months as f64;
            AnnualAggregate {
                year,
                months,
                average_temperature: sums[0] / n,
                max_temperature: sums[1] / n,
                min_temperature: sums[2] / n,
                total_rainfall: sums[3] / n,
            }
        })
        .collect()
}

/// Summary statistics of one variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveStatistics {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; undefined for a single observation
    pub std: Option<f64>,
    pub min: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub max: f64,
}

impl DescriptiveStatistics {
    /// Statistics of a non-empty sample
    fn from_values(mut values: Vec<f64>) -> Self {
        values.sort_by(f64::total_cmp);
        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let std = (count > 1).then(|| {
            let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (count - 1) as f64).sqrt()
        });

        Self {
            count,
            mean,
            std,
            min: values[0],
            p25: percentile(&values, 0.25),
            median: percentile(&values, 0.5),
            p75: percentile(&values, 0.75),
            max: values[count - 1],
        }
    }
}

/// Linear interpolation between closest ranks of a sorted sample
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (position - lower as f64)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableSummary {
    pub variable: ClimateVariable,
    pub statistics: DescriptiveStatistics,
}

/// Descriptive statistics of every numeric variable
pub fn describe(dataset: &ClimateDataset) -> Result<Vec<VariableSummary>> {
    if dataset.is_empty() {
        return Err(ClimateError::empty_dataset(
            "cannot describe an empty dataset",
        ));
    }

    Ok(ClimateVariable::ALL
        .iter()
        .map(|&variable| VariableSummary {
            variable,
            statistics: DescriptiveStatistics::from_values(
                dataset.records().iter().map(|r| r.value(variable)).collect(),
            ),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{record, synthetic_dataset};

    #[test]
    fn test_annual_aggregates_are_means() {
        let dataset = ClimateDataset::new(vec![
            record(2000, 1, 20.0),
            record(2000, 2, 22.0),
            record(2001, 1, 25.0),
        ])
        .unwrap();
        let annual = annual_aggregates(&dataset);

        assert_eq!(annual.len(), 2);
        assert_eq!(annual[0].year, 2000);
        assert_eq!(annual[0].months, 2);
        assert_eq!(annual[0].average_temperature, 21.0);
        assert_eq!(annual[0].max_temperature, 27.0);
        assert_eq!(annual[1].value(ClimateVariable::AverageTemperature), 25.0);
    }

    #[test]
    fn test_percentiles_interpolate() {
        let stats = DescriptiveStatistics::from_values(vec![4.0, 1.0, 3.0, 2.0]);
        assert_eq!(stats.count, 4);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 4.0);
        assert_eq!(stats.median, 2.5);
        assert_eq!(stats.p25, 1.75);
        assert_eq!(stats.p75, 3.25);
        assert_eq!(stats.mean, 2.5);
        let std = stats.std.unwrap();
        assert!((std - (5.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_single_value_has_no_std() {
        let stats = DescriptiveStatistics::from_values(vec![7.0]);
        assert_eq!(stats.std, None);
        assert_eq!(stats.median, 7.0);
    }

    #[test]
    fn test_describe_covers_all_variables() {
        let summaries = describe(&synthetic_dataset(2000, 2002)).unwrap();
        assert_eq!(summaries.len(), 4);
        assert!(summaries.iter().all(|s| s.statistics.count == 36));
    }

    #[test]
    fn test_describe_empty() {
        assert!(matches!(
            describe(&ClimateDataset::default()),
            Err(ClimateError::EmptyDataset { .. })
        ));
    }
}
