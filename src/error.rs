//! Error types and handling for the `tzclimate` library

use thiserror::Error;

/// Main error type for climate analysis operations
#[derive(Error, Debug)]
pub enum ClimateError {
    /// Out-of-range year, month, test fraction or other argument
    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },

    /// The operation needs at least one row and got none
    #[error("Empty dataset: {message}")]
    EmptyDataset { message: String },

    /// No records for a requested month/year combination
    #[error("No data: {message}")]
    NoData { message: String },

    /// Not enough observations for the requested analysis
    #[error("Insufficient data: {message}")]
    InsufficientData { message: String },

    /// Schema or type violation while loading a dataset
    #[error("Malformed dataset: {message}")]
    MalformedDataset { message: String },

    /// Prediction requested before any model artifact exists
    #[error("No trained model found at {path}")]
    ModelNotTrained { path: String },

    /// Model artifact could not be encoded or decoded
    #[error("Model artifact error: {message}")]
    Artifact { message: String },

    /// Chart rendering errors
    #[error("Chart error: {message}")]
    Chart { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl ClimateError {
    /// Create a new invalid parameter error
    pub fn invalid_parameter<S: Into<String>>(message: S) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }

    /// Create a new empty dataset error
    pub fn empty_dataset<S: Into<String>>(message: S) -> Self {
        Self::EmptyDataset {
            message: message.into(),
        }
    }

    /// Create a new missing data error
    pub fn no_data<S: Into<String>>(message: S) -> Self {
        Self::NoData {
            message: message.into(),
        }
    }

    /// Create a new insufficient data error
    pub fn insufficient_data<S: Into<String>>(message: S) -> Self {
        Self::InsufficientData {
            message: message.into(),
        }
    }

    /// Create a new malformed dataset error
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::MalformedDataset {
            message: message.into(),
        }
    }

    pub fn model_not_trained<S: Into<String>>(path: S) -> Self {
        Self::ModelNotTrained { path: path.into() }
    }

    pub fn artifact<S: Into<String>>(message: S) -> Self {
        Self::Artifact {
            message: message.into(),
        }
    }

    pub fn chart<S: Into<String>>(message: S) -> Self {
        Self::Chart {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ClimateError::InvalidParameter { message } => format!("Invalid input: {message}"),
            ClimateError::EmptyDataset { .. } => {
                "The dataset has no rows for this operation. Please check the data file.".to_string()
            }
            ClimateError::NoData { message } => format!("No historical data: {message}"),
            ClimateError::InsufficientData { message } => {
                format!("Not enough data for this analysis: {message}")
            }
            ClimateError::MalformedDataset { message } => {
                format!("The climate data file could not be read: {message}")
            }
            ClimateError::ModelNotTrained { .. } => {
                "No trained model found. Please run the train command first.".to_string()
            }
            ClimateError::Artifact { .. } => {
                "The saved model could not be read. Please retrain the model.".to_string()
            }
            ClimateError::Chart { message } => format!("Chart rendering failed: {message}"),
            ClimateError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            ClimateError::Io { .. } => {
                "File operation failed. Please check file paths and permissions.".to_string()
            }
        }
    }
}
