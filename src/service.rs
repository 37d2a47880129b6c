//! Caller-facing facade over training, persistence and forecasting

use tracing::{info, instrument, warn};

use crate::config::ClimateConfig;
use crate::evaluation::evaluate;
use crate::forecast::predict_with_context;
use crate::models::{ClimateDataset, EvaluationReport, PredictionResult};
use crate::training::{ArtifactStore, ModelKind, ModelTrainer, TrainedModel};
use crate::{ClimateError, Result};

/// Ties the trainer and the artifact store to one configuration.
///
/// The service holds no model itself; callers keep the [`TrainedModel`]
/// handle and pass it back for predictions.
#[derive(Debug, Clone)]
pub struct ClimateService {
    trainer: ModelTrainer,
    store: ArtifactStore,
    min_year: i32,
    max_year: i32,
}

impl ClimateService {
    pub fn new(config: &ClimateConfig) -> Self {
        Self {
            trainer: ModelTrainer::new(config.model.forest_params()),
            store: ArtifactStore::new(config.model.artifact_path.clone()),
            min_year: config.forecast.min_year,
            max_year: config.forecast.max_year,
        }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Split, fit and evaluate
    #[instrument(level = "info", skip(self, dataset), fields(rows = dataset.len()))]
    pub fn train(
        &self,
        dataset: &ClimateDataset,
        kind: ModelKind,
        test_fraction: f64,
    ) -> Result<(TrainedModel, EvaluationReport)> {
        let (train_set, test_set) = self.trainer.split(dataset, test_fraction)?;
        let model = self.trainer.train(&train_set, kind)?;
        let report = evaluate(&model, &train_set, &test_set)?;
        Ok((model, report))
    }

    /// Train and persist the resulting model
    pub fn train_and_save(
        &self,
        dataset: &ClimateDataset,
        kind: ModelKind,
        test_fraction: f64,
    ) -> Result<(TrainedModel, EvaluationReport)> {
        let (model, report) = self.train(dataset, kind, test_fraction)?;
        self.store.save(&model)?;
        Ok((model, report))
    }

    /// The persisted model; `ModelNotTrained` when nothing has been saved
    pub fn load_model(&self) -> Result<TrainedModel> {
        self.store.load()
    }

    /// Forecast with historical context. Years outside the configured window
    /// are rejected.
    #[instrument(level = "info", skip(self, model, dataset))]
    pub fn predict(
        &self,
        model: Option<&TrainedModel>,
        dataset: &ClimateDataset,
        year: i32,
        month: u32,
    ) -> Result<PredictionResult> {
        if !(self.min_year..=self.max_year).contains(&year) {
            warn!("Rejected forecast year {}", year);
            return Err(ClimateError::invalid_parameter(format!(
                "year must be between {} and {}, got {year}",
                self.min_year, self.max_year
            )));
        }

        let result = predict_with_context(model, dataset, year, month)?;
        info!("{}", result.describe_delta());
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::synthetic_dataset;
    use tempfile::TempDir;

    fn service(dir: &TempDir) -> ClimateService {
        let mut config = ClimateConfig::default();
        config.model.artifact_path = dir.path().join("model.bin");
        config.model.n_trees = 10;
        ClimateService::new(&config)
    }

    #[test]
    fn test_train_save_load_predict() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);
        let dataset = synthetic_dataset(2000, 2012);

        let (model, report) = service
            .train_and_save(&dataset, ModelKind::RandomForest, 0.2)
            .unwrap();
        assert!(report.train_rmse.is_finite());
        assert!(service.store().exists());

        let loaded = service.load_model().unwrap();
        let original = service.predict(Some(&model), &dataset, 2025, 6).unwrap();
        let restored = service.predict(Some(&loaded), &dataset, 2025, 6).unwrap();
        assert_eq!(original.predicted_temperature, restored.predicted_temperature);
    }

    #[test]
    fn test_load_without_training() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            service(&dir).load_model(),
            Err(ClimateError::ModelNotTrained { .. })
        ));
    }

    #[test]
    fn test_year_outside_window() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);
        let dataset = synthetic_dataset(2000, 2002);
        let (model, _) = service.train(&dataset, ModelKind::Linear, 0.25).unwrap();

        assert!(matches!(
            service.predict(Some(&model), &dataset, 2031, 6),
            Err(ClimateError::InvalidParameter { .. })
        ));
        assert!(service.predict(Some(&model), &dataset, 2030, 6).is_ok());
    }
}
