//! Historical context for a forecast month

use tracing::debug;

use crate::models::{ClimateDataset, Comparison, Direction};
use crate::{ClimateError, Result};

pub(crate) fn check_month(month: u32) -> Result<()> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(ClimateError::invalid_parameter(format!(
            "month must be between 1 and 12, got {month}"
        )))
    }
}

/// Mean average temperature of `month` across all recorded years
pub fn historical_average(dataset: &ClimateDataset, month: u32) -> Result<f64> {
    check_month(month)?;

    let (sum, count) = dataset
        .for_month(month)
        .fold((0.0, 0usize), |(sum, count), r| {
            (sum + r.average_temperature, count + 1)
        });
    if count == 0 {
        return Err(ClimateError::no_data(format!(
            "no records for month {month}"
        )));
    }

    let average = sum / count as f64;
    debug!("Historical average for month {}: {:.2} over {} years", month, average, count);
    Ok(average)
}

/// `(year, average temperature)` for every year with data for `month`,
/// ascending by year. Empty when nothing matches.
pub fn historical_series(dataset: &ClimateDataset, month: u32) -> Vec<(i32, f64)> {
    dataset
        .for_month(month)
        .map(|r| (r.year, r.average_temperature))
        .collect()
}

/// Compare a prediction against the historical average
#[must_use]
pub fn compare(prediction: f64, historical_average: f64) -> Comparison {
    let delta = prediction - historical_average;
    let direction = if delta > 0.0 {
        Direction::Higher
    } else if delta < 0.0 {
        Direction::Lower
    } else {
        Direction::Equal
    };
    Comparison { delta, direction }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::record;
    use rstest::rstest;

    fn dataset() -> ClimateDataset {
        ClimateDataset::new(vec![
            record(2002, 6, 23.0),
            record(2000, 6, 24.0),
            record(2001, 6, 25.5),
            record(2001, 7, 21.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_single_record_average() {
        let dataset = ClimateDataset::new(vec![record(2010, 6, 24.0)]).unwrap();
        assert_eq!(historical_average(&dataset, 6).unwrap(), 24.0);
    }

    #[test]
    fn test_average_is_arithmetic_mean() {
        let avg = historical_average(&dataset(), 6).unwrap();
        assert!((avg - (24.0 + 25.5 + 23.0) / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_average_missing_month() {
        assert!(matches!(
            historical_average(&dataset(), 1),
            Err(ClimateError::NoData { .. })
        ));
    }

    #[test]
    fn test_average_invalid_month() {
        assert!(matches!(
            historical_average(&dataset(), 13),
            Err(ClimateError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_series_ordered_by_year() {
        assert_eq!(
            historical_series(&dataset(), 6),
            vec![(2000, 24.0), (2001, 25.5), (2002, 23.0)]
        );
    }

    #[test]
    fn test_series_empty_when_no_match() {
        assert!(historical_series(&dataset(), 2).is_empty());
    }

    #[rstest]
    #[case(25.0, 24.0, 1.0, Direction::Higher)]
    #[case(23.0, 24.0, -1.0, Direction::Lower)]
    #[case(24.0, 24.0, 0.0, Direction::Equal)]
    fn test_compare(
        #[case] prediction: f64,
        #[case] average: f64,
        #[case] delta: f64,
        #[case] direction: Direction,
    ) {
        let comparison = compare(prediction, average);
        assert_eq!(comparison.delta, delta);
        assert_eq!(comparison.direction, direction);
    }
}
