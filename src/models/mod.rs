//! Data models for the tzclimate library
//!
//! - Record: monthly climate observations and the dataset that owns them
//! - Prediction: forecast, comparison and evaluation results

pub mod prediction;
pub mod record;

pub use prediction::{Comparison, Direction, EvaluationReport, PredictionResult};
pub use record::{ClimateDataset, ClimateRecord, ClimateVariable};
