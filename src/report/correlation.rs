//! Pairwise correlation of annual means

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::summary::annual_aggregates;
use crate::models::{ClimateDataset, ClimateVariable};
use crate::{ClimateError, Result};

/// Symmetric matrix of Pearson coefficients. `None` where one of the series
/// has no variance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub variables: Vec<ClimateVariable>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    #[must_use]
    pub fn get(&self, a: ClimateVariable, b: ClimateVariable) -> Option<f64> {
        let i = self.variables.iter().position(|&v| v == a)?;
        let j = self.variables.iter().position(|&v| v == b)?;
        self.values[i][j]
    }
}

/// Correlate the yearly means of `variables`
pub fn correlation_matrix(
    dataset: &ClimateDataset,
    variables: &[ClimateVariable],
) -> Result<CorrelationMatrix> {
    if variables.is_empty() {
        return Err(ClimateError::invalid_parameter(
            "at least one variable is required",
        ));
    }
    if dataset.is_empty() {
        return Err(ClimateError::empty_dataset(
            "cannot correlate an empty dataset",
        ));
    }

    let annual = annual_aggregates(dataset);
    if annual.len() < 2 {
        return Err(ClimateError::insufficient_data(format!(
            "correlation needs at least 2 years of data, got {}",
            annual.len()
        )));
    }

    let series: Vec<Vec<f64>> = variables
        .iter()
        .map(|&v| annual.iter().map(|a| a.value(v)).collect())
        .collect();
    let values = series
        .iter()
        .map(|x| series.iter().map(|y| pearson(x, y)).collect())
        .collect();

    debug!(
        "Correlated {} variables over {} years",
        variables.len(),
        annual.len()
    );
    Ok(CorrelationMatrix {
        variables: variables.to_vec(),
        values,
    })
}

fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let (dx, dy) = (x - mean_x, y - mean_y);
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some((cov / (var_x * var_y).sqrt()).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{record, synthetic_dataset};

    #[test]
    fn test_matrix_is_symmetric_with_unit_diagonal() {
        let variables = ClimateVariable::ALL;
        let matrix = correlation_matrix(&synthetic_dataset(2000, 2010), &variables).unwrap();

        assert_eq!(matrix.values.len(), variables.len());
        for (i, row) in matrix.values.iter().enumerate() {
            assert!((row[i].unwrap() - 1.0).abs() < 1e-12);
            for (j, value) in row.iter().enumerate() {
                let value = value.unwrap();
                assert!((-1.0..=1.0).contains(&value));
                assert_eq!(Some(value), matrix.values[j][i]);
            }
        }
    }

    #[test]
    fn test_opposite_trends_are_anticorrelated() {
        // temperature rises while rainfall falls year over year
        let matrix = correlation_matrix(
            &synthetic_dataset(2000, 2010),
            &[ClimateVariable::AverageTemperature, ClimateVariable::TotalRainfall],
        )
        .unwrap();
        let r = matrix
            .get(ClimateVariable::AverageTemperature, ClimateVariable::TotalRainfall)
            .unwrap();
        assert!(r < -0.99);
    }

    #[test]
    fn test_constant_series_has_no_coefficient() {
        let dataset = ClimateDataset::new(vec![
            record(2000, 1, 20.0),
            record(2001, 1, 21.0),
            record(2002, 1, 22.0),
        ])
        .unwrap();
        let matrix = correlation_matrix(
            &dataset,
            &[ClimateVariable::AverageTemperature, ClimateVariable::TotalRainfall],
        )
        .unwrap();
        assert_eq!(
            matrix.get(ClimateVariable::AverageTemperature, ClimateVariable::TotalRainfall),
            None
        );
        let r = matrix
            .get(ClimateVariable::AverageTemperature, ClimateVariable::AverageTemperature)
            .unwrap();
        assert!((r - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_year_is_insufficient() {
        assert!(matches!(
            correlation_matrix(&synthetic_dataset(2000, 2000), &ClimateVariable::ALL),
            Err(ClimateError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(
            correlation_matrix(&synthetic_dataset(2000, 2002), &[]),
            Err(ClimateError::InvalidParameter { .. })
        ));
        assert!(matches!(
            correlation_matrix(&ClimateDataset::default(), &ClimateVariable::ALL),
            Err(ClimateError::EmptyDataset { .. })
        ));
    }
}
