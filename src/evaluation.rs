//! Accuracy metrics for fitted models

use tracing::{info, instrument};

use crate::models::{ClimateRecord, EvaluationReport};
use crate::training::{Regressor, target};
use crate::{ClimateError, Result};

/// Root mean squared error
pub fn rmse(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    check_lengths(actual, predicted)?;
    let mse = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum::<f64>()
        / actual.len() as f64;
    Ok(mse.sqrt())
}

/// Coefficient of determination.
///
/// A constant target has no variance to explain: the score is 1.0 for a
/// perfect fit and 0.0 otherwise.
pub fn r_squared(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    check_lengths(actual, predicted)?;
    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();

    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }
    Ok(1.0 - ss_res / ss_tot)
}

fn check_lengths(actual: &[f64], predicted: &[f64]) -> Result<()> {
    if actual.is_empty() {
        return Err(ClimateError::empty_dataset("metrics need at least one observation"));
    }
    if actual.len() != predicted.len() {
        return Err(ClimateError::invalid_parameter(format!(
            "expected {} predictions, got {}",
            actual.len(),
            predicted.len()
        )));
    }
    Ok(())
}

/// Score a fitted model on its train and test splits
#[instrument(level = "debug", skip_all, fields(train = train_set.len(), test = test_set.len()))]
pub fn evaluate<M: Regressor + ?Sized>(
    model: &M,
    train_set: &[ClimateRecord],
    test_set: &[ClimateRecord],
) -> Result<EvaluationReport> {
    if train_set.is_empty() || test_set.is_empty() {
        return Err(ClimateError::empty_dataset(format!(
            "evaluation needs non-empty splits (train: {}, test: {})",
            train_set.len(),
            test_set.len()
        )));
    }

    let train_actual: Vec<f64> = train_set.iter().map(target).collect();
    let test_actual: Vec<f64> = test_set.iter().map(target).collect();
    let train_predicted = model.predict_records(train_set);
    let test_predicted = model.predict_records(test_set);

    let report = EvaluationReport {
        train_rmse: rmse(&train_actual, &train_predicted)?,
        test_rmse: rmse(&test_actual, &test_predicted)?,
        train_r2: r_squared(&train_actual, &train_predicted)?,
        test_r2: r_squared(&test_actual, &test_predicted)?,
    };
    info!(
        "Evaluation: train RMSE {:.3}, test RMSE {:.3}, train R² {:.3}, test R² {:.3}",
        report.train_rmse, report.test_rmse, report.train_r2, report.test_r2
    );
    Ok(report)
}
