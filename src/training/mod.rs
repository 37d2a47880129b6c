//! Model training
//!
//! This module fits regression models on the `[year, month]` feature vector:
//! - Deterministic train/test splitting
//! - Ordinary least squares and random forest estimators
//! - The trainer that ties estimator choice to a [`TrainedModel`]
//! - Atomic persistence of the fitted model artifact

pub mod artifact;
pub mod forest;
pub mod linear;
pub mod split;
pub mod trainer;

pub use artifact::ArtifactStore;
pub use forest::{ForestParams, RandomForest};
pub use linear::LinearRegression;
pub use split::{DEFAULT_SEED, split, split_with_seed};
pub use trainer::{Estimator, Feature, ModelKind, ModelTrainer, TrainedModel};

use crate::models::ClimateRecord;

/// Fixed-order model input: `[year, month]`
pub type FeatureVector = [f64; 2];

/// Feature vector of a record
pub fn features(record: &ClimateRecord) -> FeatureVector {
    [f64::from(record.year), f64::from(record.month)]
}

/// Regression target of a record
pub fn target(record: &ClimateRecord) -> f64 {
    record.average_temperature
}

/// A fitted model that maps feature vectors to a temperature
pub trait Regressor {
    fn predict_one(&self, features: &FeatureVector) -> f64;

    fn predict_records(&self, records: &[ClimateRecord]) -> Vec<f64> {
        records
            .iter()
            .map(|r| self.predict_one(&features(r)))
            .collect()
    }
}
