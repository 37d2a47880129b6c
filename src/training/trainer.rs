//! Model selection and fitting

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::{FeatureVector, ForestParams, LinearRegression, RandomForest, Regressor};
use super::split::split_with_seed;
use crate::models::{ClimateDataset, ClimateRecord};
use crate::{ClimateError, Result};

/// Regression variants the trainer can fit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    Linear,
    RandomForest,
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelKind::Linear => f.write_str("linear"),
            ModelKind::RandomForest => f.write_str("random-forest"),
        }
    }
}

impl FromStr for ModelKind {
    type Err = ClimateError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace(['_', ' '], "-").as_str() {
            "linear" | "linear-regression" | "ols" => Ok(ModelKind::Linear),
            "random-forest" | "forest" | "rf" => Ok(ModelKind::RandomForest),
            other => Err(ClimateError::invalid_parameter(format!(
                "unknown model kind '{other}'. Must be one of: linear, random-forest"
            ))),
        }
    }
}

/// Named model inputs, in the order they appear in a [`FeatureVector`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Feature {
    Year,
    Month,
}

pub const FEATURE_SPEC: [Feature; 2] = [Feature::Year, Feature::Month];

/// The fitted estimator behind a [`TrainedModel`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Estimator {
    Linear(LinearRegression),
    RandomForest(RandomForest),
}

impl Regressor for Estimator {
    fn predict_one(&self, features: &FeatureVector) -> f64 {
        match self {
            Estimator::Linear(model) => model.predict_one(features),
            Estimator::RandomForest(model) => model.predict_one(features),
        }
    }
}

/// A fitted regression model plus the metadata needed to use it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel {
    pub model_kind: ModelKind,
    pub feature_spec: Vec<Feature>,
    pub trained_at: DateTime<Utc>,
    /// Number of rows the estimator was fitted on
    pub training_rows: usize,
    estimator: Estimator,
}

impl TrainedModel {
    pub fn estimator(&self) -> &Estimator {
        &self.estimator
    }
}

impl Regressor for TrainedModel {
    fn predict_one(&self, features: &FeatureVector) -> f64 {
        self.estimator.predict_one(features)
    }
}

/// Splits data and fits the requested model kind
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelTrainer {
    forest: ForestParams,
}

impl ModelTrainer {
    pub fn new(forest: ForestParams) -> Self {
        Self { forest }
    }

    pub fn forest_params(&self) -> ForestParams {
        self.forest
    }

    /// Partition with the trainer's seed
    pub fn split(
        &self,
        dataset: &ClimateDataset,
        test_fraction: f64,
    ) -> Result<(Vec<ClimateRecord>, Vec<ClimateRecord>)> {
        split_with_seed(dataset, test_fraction, self.forest.seed)
    }

    /// Fit `model_kind` on the training rows
    #[instrument(level = "info", skip(self, train_set), fields(rows = train_set.len()))]
    pub fn train(&self, train_set: &[ClimateRecord], model_kind: ModelKind) -> Result<TrainedModel> {
        if train_set.is_empty() {
            return Err(ClimateError::empty_dataset(
                "cannot train a model on an empty training set",
            ));
        }

        let estimator = match model_kind {
            ModelKind::Linear => Estimator::Linear(LinearRegression::fit(train_set)?),
            ModelKind::RandomForest => {
                Estimator::RandomForest(RandomForest::fit(train_set, self.forest)?)
            }
        };

        info!("Trained {} model on {} rows", model_kind, train_set.len());
        Ok(TrainedModel {
            model_kind,
            feature_spec: FEATURE_SPEC.to_vec(),
            trained_at: Utc::now(),
            training_rows: train_set.len(),
            estimator,
        })
    }
}
