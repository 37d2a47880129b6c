//! Prediction and evaluation result models

use std::fmt;

use serde::{Deserialize, Serialize};

/// Accuracy of a fitted model on its train and test splits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub train_rmse: f64,
    pub test_rmse: f64,
    pub train_r2: f64,
    pub test_r2: f64,
}

/// Whether a prediction sits above, below or on the historical average
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Higher,
    Lower,
    Equal,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Higher => f.write_str("higher"),
            Direction::Lower => f.write_str("lower"),
            Direction::Equal => f.write_str("equal"),
        }
    }
}

/// Difference between a prediction and the historical average
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub delta: f64,
    pub direction: Direction,
}

/// Point forecast for a (year, month) with historical context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub year: i32,
    pub month: u32,
    /// Predicted mean temperature in °C
    pub predicted_temperature: f64,
    /// Mean temperature of the same month across all recorded years
    pub historical_average: f64,
    /// `predicted_temperature - historical_average`
    pub delta: f64,
    pub direction: Direction,
}

impl PredictionResult {
    /// One-line summary of how the prediction relates to the historical average
    pub fn describe_delta(&self) -> String {
        match self.direction {
            Direction::Equal => "Prediction equals the historical average".to_string(),
            direction => format!(
                "Prediction is {:.2}°C {} than the historical average",
                self.delta.abs(),
                direction
            ),
        }
    }
}
