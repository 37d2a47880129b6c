//! Point forecasts of monthly average temperature

use tracing::{info, instrument};

use crate::history::{check_month, compare, historical_average};
use crate::models::{ClimateDataset, PredictionResult};
use crate::training::{Regressor, TrainedModel};
use crate::{ClimateError, Result};

/// Predict the average temperature for `year`/`month`
pub fn predict<M: Regressor + ?Sized>(model: &M, year: i32, month: u32) -> Result<f64> {
    check_month(month)?;
    Ok(model.predict_one(&[f64::from(year), f64::from(month)]))
}

/// Predict and compare against the historical average of the same month.
///
/// A missing model stops the request before any historical figures are
/// computed.
#[instrument(level = "info", skip(model, dataset))]
pub fn predict_with_context(
    model: Option<&TrainedModel>,
    dataset: &ClimateDataset,
    year: i32,
    month: u32,
) -> Result<PredictionResult> {
    let model = model.ok_or_else(|| ClimateError::model_not_trained("<no model loaded>"))?;

    let predicted_temperature = predict(model, year, month)?;
    let historical_average = historical_average(dataset, month)?;
    let comparison = compare(predicted_temperature, historical_average);

    info!(
        "Predicted {:.2}°C for {}-{:02} ({:+.2}°C vs historical average)",
        predicted_temperature, year, month, comparison.delta
    );
    Ok(PredictionResult {
        year,
        month,
        predicted_temperature,
        historical_average,
        delta: comparison.delta,
        direction: comparison.direction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{linear_dataset, synthetic_dataset};
    use crate::models::Direction;
    use crate::training::{ModelKind, ModelTrainer};

    #[test]
    fn test_month_thirteen_rejected() {
        let dataset = synthetic_dataset(2000, 2001);
        let model = ModelTrainer::default()
            .train(dataset.records(), ModelKind::Linear)
            .unwrap();
        assert!(matches!(
            predict(&model, 2025, 13),
            Err(ClimateError::InvalidParameter { .. })
        ));
        assert!(matches!(
            predict(&model, 2025, 0),
            Err(ClimateError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_predict_linear_extrapolates() {
        let dataset = linear_dataset(2000, 2010);
        let model = ModelTrainer::default()
            .train(dataset.records(), ModelKind::Linear)
            .unwrap();
        let predicted = predict(&model, 2025, 6).unwrap();
        assert!((predicted - (20.0 + 0.05 * 25.0 + 0.3 * 6.0)).abs() < 1e-6);
    }

    #[test]
    fn test_prediction_with_context() {
        let dataset = linear_dataset(2000, 2010);
        let model = ModelTrainer::default()
            .train(dataset.records(), ModelKind::Linear)
            .unwrap();

        let result = predict_with_context(Some(&model), &dataset, 2025, 6).unwrap();
        let expected_average = 20.0 + 0.05 * 5.0 + 0.3 * 6.0;
        assert!((result.historical_average - expected_average).abs() < 1e-9);
        assert!((result.delta - (result.predicted_temperature - result.historical_average)).abs() < 1e-12);
        assert_eq!(result.direction, Direction::Higher);
    }

    #[test]
    fn test_missing_model_halts_before_history() {
        // the dataset has no June data, so reaching the history step would yield NoData
        let dataset = ClimateDataset::default();
        assert!(matches!(
            predict_with_context(None, &dataset, 2025, 6),
            Err(ClimateError::ModelNotTrained { .. })
        ));
    }
}
