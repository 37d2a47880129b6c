//! Ordinary least squares on the `[year, month]` features

use serde::{Deserialize, Serialize};

use super::{FeatureVector, Regressor, features, target};
use crate::models::ClimateRecord;
use crate::{ClimateError, Result};

/// Relative threshold below which the feature covariance is treated as singular
const SINGULAR_TOLERANCE: f64 = 1e-12;

/// Linear model `y = intercept + coefficients · x`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegression {
    intercept: f64,
    coefficients: FeatureVector,
}

impl LinearRegression {
    /// Fit with the closed-form least squares solution.
    ///
    /// Features are centered so the intercept drops out and the remaining
    /// 2x2 normal equations are solved directly. When the centered features
    /// are collinear (e.g. a single year of data) the minimum-norm solution
    /// is used instead of failing.
    pub fn fit(records: &[ClimateRecord]) -> Result<Self> {
        if records.is_empty() {
            return Err(ClimateError::empty_dataset(
                "linear regression needs at least one training row",
            ));
        }

        let n = records.len() as f64;
        let mut sum_x = [0.0; 2];
        let mut sum_y = 0.0;
        for record in records {
            let x = features(record);
            sum_x[0] += x[0];
            sum_x[1] += x[1];
            sum_y += target(record);
        }
        let mean_x = [sum_x[0] / n, sum_x[1] / n];
        let mean_y = sum_y / n;

        // centered cross products
        let (mut s00, mut s01, mut s11, mut c0, mut c1) = (0.0, 0.0, 0.0, 0.0, 0.0);
        for record in records {
            let x = features(record);
            let d0 = x[0] - mean_x[0];
            let d1 = x[1] - mean_x[1];
            let dy = target(record) - mean_y;
            s00 += d0 * d0;
            s01 += d0 * d1;
            s11 += d1 * d1;
            c0 += d0 * dy;
            c1 += d1 * dy;
        }

        let coefficients = solve_symmetric_2x2(s00, s01, s11, [c0, c1]);
        let intercept = mean_y - coefficients[0] * mean_x[0] - coefficients[1] * mean_x[1];

        Ok(Self {
            intercept,
            coefficients,
        })
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Coefficients for `[year, month]`
    pub fn coefficients(&self) -> FeatureVector {
        self.coefficients
    }
}

impl Regressor for LinearRegression {
    fn predict_one(&self, x: &FeatureVector) -> f64 {
        self.intercept + self.coefficients[0] * x[0] + self.coefficients[1] * x[1]
    }
}

/// Minimum-norm solution of `[[a, b], [b, d]] · beta = c` for a positive
/// semi-definite matrix
fn solve_symmetric_2x2(a: f64, b: f64, d: f64, c: [f64; 2]) -> [f64; 2] {
    let trace = a + d;
    if trace <= f64::EPSILON {
        return [0.0, 0.0];
    }

    let det = a * d - b * b;
    if det.abs() > SINGULAR_TOLERANCE * trace * trace {
        return [(d * c[0] - b * c[1]) / det, (a * c[1] - b * c[0]) / det];
    }

    // rank one: S = trace * v vᵀ with v the normalized dominant column
    let (v0, v1) = if a >= d { (a, b) } else { (b, d) };
    let norm = (v0 * v0 + v1 * v1).sqrt();
    let (v0, v1) = (v0 / norm, v1 / norm);
    let scale = (v0 * c[0] + v1 * c[1]) / trace;
    [scale * v0, scale * v1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{linear_dataset, record};

    #[test]
    fn test_recovers_exact_linear_relationship() {
        let dataset = linear_dataset(2000, 2009);
        let model = LinearRegression::fit(dataset.records()).unwrap();

        let [year_coef, month_coef] = model.coefficients();
        assert!((year_coef - 0.05).abs() < 1e-9);
        assert!((month_coef - 0.3).abs() < 1e-9);
        // 20 + 0.05 * (year - 2000) rearranges to -80 + 0.05 * year
        assert!((model.intercept() + 80.0).abs() < 1e-6);

        let predicted = model.predict_one(&[2030.0, 6.0]);
        let expected = 20.0 + 0.05 * 30.0 + 0.3 * 6.0;
        assert!((predicted - expected).abs() < 1e-6);
    }

    #[test]
    fn test_single_year_uses_month_only() {
        let records: Vec<_> = (1..=12)
            .map(|m| record(2015, m, 20.0 + f64::from(m)))
            .collect();
        let model = LinearRegression::fit(&records).unwrap();

        assert_eq!(model.coefficients()[0], 0.0);
        assert!((model.coefficients()[1] - 1.0).abs() < 1e-9);
        assert!((model.predict_one(&[2015.0, 6.0]) - 26.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_row_predicts_its_target() {
        let records = vec![record(2010, 6, 24.0)];
        let model = LinearRegression::fit(&records).unwrap();
        assert_eq!(model.predict_one(&[2030.0, 1.0]), 24.0);
    }

    #[test]
    fn test_empty_training_set() {
        assert!(matches!(
            LinearRegression::fit(&[]),
            Err(ClimateError::EmptyDataset { .. })
        ));
    }

    #[test]
    fn test_collinear_features() {
        // month rises with year, so the centered features lie on one line
        let records: Vec<_> = (0..6)
            .map(|i| record(2000 + i, 1 + i as u32, 10.0 + 2.0 * f64::from(i)))
            .collect();
        let model = LinearRegression::fit(&records).unwrap();
        for r in &records {
            let predicted = model.predict_one(&features(r));
            assert!((predicted - r.average_temperature).abs() < 1e-9);
        }
    }
}
