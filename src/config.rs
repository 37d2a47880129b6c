//! Configuration management for `tzclimate`
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::ClimateError;
use crate::training::{ForestParams, ModelKind};
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Upper bound on tree depth accepted from configuration
const MAX_TREE_DEPTH: usize = 64;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClimateConfig {
    /// Input dataset
    #[serde(default)]
    pub data: DataConfig,
    /// Model training and persistence
    #[serde(default)]
    pub model: ModelConfig,
    /// Forecast request limits
    #[serde(default)]
    pub forecast: ForecastConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Path of the monthly climate CSV
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
}

/// Model training and artifact settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Where the trained model is persisted
    #[serde(default = "default_artifact_path")]
    pub artifact_path: PathBuf,
    /// Estimator used by `train` (linear or random-forest)
    #[serde(default = "default_model_kind")]
    pub kind: String,
    /// Share of rows held out for evaluation
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,
    /// Seed for splitting and forest bootstrapping
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_n_trees")]
    pub n_trees: usize,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

/// Years the forecast surface accepts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    #[serde(default = "default_min_year")]
    pub min_year: i32,
    #[serde(default = "default_max_year")]
    pub max_year: i32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_data_path() -> PathBuf {
    PathBuf::from("data/tanzania_climate.csv")
}

fn default_artifact_path() -> PathBuf {
    PathBuf::from("random_forest_model.bin")
}

fn default_model_kind() -> String {
    ModelKind::RandomForest.to_string()
}

fn default_test_fraction() -> f64 {
    0.2
}

fn default_seed() -> u64 {
    ForestParams::default().seed
}

fn default_n_trees() -> usize {
    ForestParams::default().n_trees
}

fn default_max_depth() -> usize {
    ForestParams::default().max_depth
}

fn default_min_year() -> i32 {
    2010
}

fn default_max_year() -> i32 {
    2030
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            artifact_path: default_artifact_path(),
            kind: default_model_kind(),
            test_fraction: default_test_fraction(),
            seed: default_seed(),
            n_trees: default_n_trees(),
            max_depth: default_max_depth(),
        }
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            min_year: default_min_year(),
            max_year: default_max_year(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl ModelConfig {
    /// Configured estimator
    pub fn model_kind(&self) -> Result<ModelKind> {
        self.kind
            .parse::<ModelKind>()
            .map_err(|_| {
                ClimateError::config(format!(
                    "Invalid model kind '{}'. Must be one of: {}, {}",
                    self.kind,
                    ModelKind::Linear,
                    ModelKind::RandomForest
                ))
                .into()
            })
    }

    pub fn forest_params(&self) -> ForestParams {
        ForestParams {
            n_trees: self.n_trees,
            max_depth: self.max_depth,
            seed: self.seed,
        }
    }
}

impl ClimateConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // An explicit path must exist; the fallbacks are optional
        let config_file = match config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(ClimateError::config(format!(
                        "Configuration file not found: {}",
                        path.display()
                    ))
                    .into());
                }
                Some(path)
            }
            None => Self::get_config_path()
                .filter(|path| path.exists())
                .or_else(|| Some(PathBuf::from("config.toml")).filter(|path| path.exists())),
        };

        if let Some(config_file) = config_file {
            builder = builder.add_source(
                File::from(config_file)
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. TZCLIMATE_MODEL__N_TREES=50
        builder = builder.add_source(
            Environment::with_prefix("TZCLIMATE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: ClimateConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tzclimate").join("config.toml"))
    }

    /// Apply default values to empty configuration fields
    pub fn apply_defaults(&mut self) {
        if self.data.path.as_os_str().is_empty() {
            self.data.path = default_data_path();
        }
        if self.model.artifact_path.as_os_str().is_empty() {
            self.model.artifact_path = default_artifact_path();
        }
        if self.model.kind.is_empty() {
            self.model.kind = default_model_kind();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        let fraction = self.model.test_fraction;
        if !(fraction > 0.0 && fraction < 1.0) {
            return Err(ClimateError::config(format!(
                "Test fraction must be between 0 and 1 (exclusive), got {fraction}"
            ))
            .into());
        }

        if self.model.n_trees == 0 {
            return Err(ClimateError::config("Random forest needs at least one tree").into());
        }

        if self.model.max_depth == 0 || self.model.max_depth > MAX_TREE_DEPTH {
            return Err(ClimateError::config(format!(
                "Tree depth must be between 1 and {MAX_TREE_DEPTH}"
            ))
            .into());
        }

        if self.forecast.min_year > self.forecast.max_year {
            return Err(ClimateError::config(format!(
                "Forecast min_year ({}) cannot exceed max_year ({})",
                self.forecast.min_year, self.forecast.max_year
            ))
            .into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(ClimateError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(ClimateError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        self.model.model_kind()?;

        Ok(())
    }
}
