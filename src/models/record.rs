//! Climate observation records and the dataset that owns them

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{ClimateError, Result};

/// Monthly climate observation for a single (year, month)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimateRecord {
    pub year: i32,
    /// Calendar month, 1 = January
    pub month: u32,
    /// Mean temperature in °C
    pub average_temperature: f64,
    /// Maximum temperature in °C
    pub max_temperature: f64,
    /// Minimum temperature in °C
    pub min_temperature: f64,
    /// Total rainfall in mm
    pub total_rainfall: f64,
}

impl ClimateRecord {
    /// Value of the given variable for this record
    pub fn value(&self, variable: ClimateVariable) -> f64 {
        match variable {
            ClimateVariable::AverageTemperature => self.average_temperature,
            ClimateVariable::MaxTemperature => self.max_temperature,
            ClimateVariable::MinTemperature => self.min_temperature,
            ClimateVariable::TotalRainfall => self.total_rainfall,
        }
    }

    /// Months elapsed since year 0, used to check monthly continuity
    pub fn month_index(&self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }
}

/// Numeric variables of the climate table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClimateVariable {
    AverageTemperature,
    MaxTemperature,
    MinTemperature,
    TotalRainfall,
}

impl ClimateVariable {
    pub const ALL: [ClimateVariable; 4] = [
        ClimateVariable::AverageTemperature,
        ClimateVariable::TotalRainfall,
        ClimateVariable::MaxTemperature,
        ClimateVariable::MinTemperature,
    ];

    /// Column name used in the source CSV files
    pub fn column_name(self) -> &'static str {
        match self {
            ClimateVariable::AverageTemperature => "Average_Temperature_C",
            ClimateVariable::MaxTemperature => "Max_Temperature_C",
            ClimateVariable::MinTemperature => "Min_Temperature_C",
            ClimateVariable::TotalRainfall => "Total_Rainfall_mm",
        }
    }

    /// Human-readable label with unit
    pub fn label(self) -> &'static str {
        match self {
            ClimateVariable::AverageTemperature => "Average temperature (°C)",
            ClimateVariable::MaxTemperature => "Max temperature (°C)",
            ClimateVariable::MinTemperature => "Min temperature (°C)",
            ClimateVariable::TotalRainfall => "Total rainfall (mm)",
        }
    }
}

impl fmt::Display for ClimateVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ClimateVariable::AverageTemperature => "temperature",
            ClimateVariable::MaxTemperature => "max-temperature",
            ClimateVariable::MinTemperature => "min-temperature",
            ClimateVariable::TotalRainfall => "rainfall",
        };
        f.write_str(name)
    }
}

impl FromStr for ClimateVariable {
    type Err = ClimateError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "temperature" | "average-temperature" | "average-temperature-c" | "avg-temp" => {
                Ok(ClimateVariable::AverageTemperature)
            }
            "max-temperature" | "max-temperature-c" | "max-temp" => {
                Ok(ClimateVariable::MaxTemperature)
            }
            "min-temperature" | "min-temperature-c" | "min-temp" => {
                Ok(ClimateVariable::MinTemperature)
            }
            "rainfall" | "total-rainfall" | "total-rainfall-mm" => {
                Ok(ClimateVariable::TotalRainfall)
            }
            other => Err(ClimateError::invalid_parameter(format!(
                "unknown climate variable '{other}'. Must be one of: temperature, rainfall, max-temperature, min-temperature"
            ))),
        }
    }
}

/// Ordered, validated collection of monthly climate records.
///
/// Records are sorted by (year, month) and each pair occurs at most once.
/// The dataset is immutable; reloading produces a new one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ClimateRecord>", into = "Vec<ClimateRecord>")]
pub struct ClimateDataset {
    records: Vec<ClimateRecord>,
}

impl ClimateDataset {
    /// Build a dataset, rejecting invalid months and duplicate (year, month) pairs
    pub fn new(mut records: Vec<ClimateRecord>) -> Result<Self> {
        if let Some(bad) = records.iter().find(|r| !(1..=12).contains(&r.month)) {
            return Err(ClimateError::malformed(format!(
                "month {} for year {} is outside 1..=12",
                bad.month, bad.year
            )));
        }

        records.sort_by_key(|r| (r.year, r.month));

        if let Some(pair) = records
            .windows(2)
            .find(|w| w[0].year == w[1].year && w[0].month == w[1].month)
        {
            return Err(ClimateError::malformed(format!(
                "duplicate record for {}-{:02}",
                pair[0].year, pair[0].month
            )));
        }

        Ok(Self { records })
    }

    pub fn records(&self) -> &[ClimateRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct years in ascending order
    pub fn years(&self) -> Vec<i32> {
        self.records
            .iter()
            .map(|r| r.year)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Records for one calendar month, ascending by year
    pub fn for_month(&self, month: u32) -> impl Iterator<Item = &ClimateRecord> {
        self.records.iter().filter(move |r| r.month == month)
    }
}

impl TryFrom<Vec<ClimateRecord>> for ClimateDataset {
    type Error = ClimateError;

    fn try_from(records: Vec<ClimateRecord>) -> Result<Self> {
        Self::new(records)
    }
}

impl From<ClimateDataset> for Vec<ClimateRecord> {
    fn from(dataset: ClimateDataset) -> Self {
        dataset.records
    }
}

impl<'a> IntoIterator for &'a ClimateDataset {
    type Item = &'a ClimateRecord;
    type IntoIter = std::slice::Iter<'a, ClimateRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn record(year: i32, month: u32, temp: f64) -> ClimateRecord {
        ClimateRecord {
            year,
            month,
            average_temperature: temp,
            max_temperature: temp + 5.0,
            min_temperature: temp - 5.0,
            total_rainfall: 80.0,
        }
    }

    #[test]
    fn test_dataset_sorted_by_year_and_month() {
        let dataset = ClimateDataset::new(vec![
            record(2001, 2, 24.0),
            record(2000, 12, 23.0),
            record(2001, 1, 25.0),
        ])
        .unwrap();

        let keys: Vec<(i32, u32)> = dataset.records().iter().map(|r| (r.year, r.month)).collect();
        assert_eq!(keys, vec![(2000, 12), (2001, 1), (2001, 2)]);
        assert_eq!(dataset.years(), vec![2000, 2001]);
    }

    #[test]
    fn test_duplicate_pair_rejected() {
        let result = ClimateDataset::new(vec![record(2000, 6, 24.0), record(2000, 6, 25.0)]);
        assert!(matches!(result, Err(ClimateError::MalformedDataset { .. })));
    }

    #[rstest]
    #[case(0)]
    #[case(13)]
    fn test_invalid_month_rejected(#[case] month: u32) {
        let result = ClimateDataset::new(vec![record(2000, month, 24.0)]);
        assert!(matches!(result, Err(ClimateError::MalformedDataset { .. })));
    }

    #[rstest]
    #[case("temperature", ClimateVariable::AverageTemperature)]
    #[case("Rainfall", ClimateVariable::TotalRainfall)]
    #[case("Max_Temperature_C", ClimateVariable::MaxTemperature)]
    #[case("min-temp", ClimateVariable::MinTemperature)]
    fn test_variable_parsing(#[case] input: &str, #[case] expected: ClimateVariable) {
        assert_eq!(input.parse::<ClimateVariable>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_variable() {
        assert!("humidity".parse::<ClimateVariable>().is_err());
    }

    #[test]
    fn test_deserialize_validates_records() {
        let dataset = ClimateDataset::new(vec![record(2001, 1, 25.0), record(2000, 12, 24.0)]).unwrap();
        let encoded = serde_json::to_string(&dataset).unwrap();
        let decoded: ClimateDataset = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, dataset);

        let duplicated = serde_json::to_string(&vec![record(2000, 6, 24.0), record(2000, 6, 25.0)]).unwrap();
        assert!(serde_json::from_str::<ClimateDataset>(&duplicated).is_err());

        let bad_month = serde_json::to_string(&vec![record(2000, 13, 24.0)]).unwrap();
        assert!(serde_json::from_str::<ClimateDataset>(&bad_month).is_err());
    }

    #[test]
    fn test_for_month_filters() {
        let dataset = ClimateDataset::new(vec![
            record(2000, 6, 24.0),
            record(2000, 7, 22.0),
            record(2001, 6, 25.0),
        ])
        .unwrap();
        let june: Vec<f64> = dataset.for_month(6).map(|r| r.average_temperature).collect();
        assert_eq!(june, vec![24.0, 25.0]);
    }
}
