//! `tzclimate` - Historical climate exploration and temperature forecasting
//! for Tanzania
//!
//! This library loads the monthly climate table, trains regression models
//! on `[year, month]`, forecasts average temperature with historical
//! context, and produces the analytics behind the dashboard views.

pub mod charts;
pub mod config;
pub mod dataset;
pub mod error;
pub mod evaluation;
pub mod forecast;
pub mod history;
pub mod logging;
pub mod models;
pub mod report;
pub mod service;
pub mod training;

#[cfg(test)]
mod fixtures;

// Re-export core types for public API
pub use config::ClimateConfig;
pub use dataset::{load_dataset, read_dataset};
pub use error::ClimateError;
pub use evaluation::evaluate;
pub use forecast::{predict, predict_with_context};
pub use history::{compare, historical_average, historical_series};
pub use models::{
    ClimateDataset, ClimateRecord, ClimateVariable, Direction, EvaluationReport, PredictionResult,
};
pub use report::{CorrelationMatrix, Decomposition, correlation_matrix, decompose};
pub use service::ClimateService;
pub use training::{ArtifactStore, ModelKind, ModelTrainer, Regressor, TrainedModel};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, ClimateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
