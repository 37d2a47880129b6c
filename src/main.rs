//! # tzclimate
//!
//! Command-line interface for exploring the Tanzanian climate record and
//! forecasting monthly average temperature.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::debug;

use tzclimate::charts::{render_annual_trends, render_prediction_context, render_seasonal_pattern};
use tzclimate::report::{annual_aggregates, describe, monthly_seasonal_pattern};
use tzclimate::training::Estimator;
use tzclimate::{
    ClimateConfig, ClimateError, ClimateService, ClimateVariable, ModelKind, TrainedModel,
    correlation_matrix, decompose, historical_average, historical_series, load_dataset, logging,
};

#[derive(Parser)]
#[command(name = "tzclimate", version)]
#[command(about = "Historical climate exploration and temperature forecasting for Tanzania", long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Climate CSV, overrides data.path
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Model artifact, overrides model.artifact_path
    #[arg(long, global = true)]
    model: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a model, report its accuracy and save it
    Train {
        /// Estimator (linear, random-forest)
        #[arg(short, long)]
        kind: Option<ModelKind>,

        /// Share of rows held out for evaluation
        #[arg(short, long)]
        test_fraction: Option<f64>,
    },

    /// Forecast the average temperature of a month
    Predict {
        #[arg(short, long)]
        year: i32,

        #[arg(short, long)]
        month: u32,

        /// Write an SVG chart of the prediction in context
        #[arg(long)]
        chart: Option<PathBuf>,
    },

    /// Per-year temperatures of one calendar month
    History {
        #[arg(short, long)]
        month: u32,
    },

    /// Seasonal decomposition of a variable
    Decompose {
        /// Variable (temperature, rainfall, max-temperature, min-temperature)
        #[arg(long, default_value = "temperature")]
        variable: ClimateVariable,

        /// Write an SVG chart of the monthly seasonal pattern
        #[arg(long)]
        chart: Option<PathBuf>,
    },

    /// Correlation of annual means
    Correlate {
        /// Comma-separated variables (default: all)
        #[arg(long, value_delimiter = ',')]
        variables: Vec<ClimateVariable>,
    },

    /// Descriptive statistics and annual means
    Summary {
        /// Write an SVG chart of annual temperature and rainfall
        #[arg(long)]
        chart: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbose = cli.verbose;

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            match error.downcast_ref::<ClimateError>() {
                Some(climate_error) => eprintln!("Error: {}", climate_error.user_message()),
                None => eprintln!("Error: {error:#}"),
            }
            if verbose {
                eprintln!("Caused by: {error:?}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match cli.config {
        Some(path) => ClimateConfig::load_from_path(Some(path))?,
        None => ClimateConfig::load()?,
    };
    if let Some(data) = cli.data {
        config.data.path = data;
    }
    if let Some(model) = cli.model {
        config.model.artifact_path = model;
    }

    logging::init(&config.logging, cli.verbose)?;
    debug!("Using configuration: {:?}", config);

    let service = ClimateService::new(&config);
    let json = cli.json;

    match cli.command {
        Commands::Train {
            kind,
            test_fraction,
        } => {
            let kind = match kind {
                Some(kind) => kind,
                None => config.model.model_kind()?,
            };
            let test_fraction = test_fraction.unwrap_or(config.model.test_fraction);
            let dataset = load_dataset(&config.data.path)?;

            let (model, report) = service.train_and_save(&dataset, kind, test_fraction)?;
            if json {
                print_json(&json!({
                    "model_kind": model.model_kind,
                    "trained_at": model.trained_at,
                    "training_rows": model.training_rows,
                    "artifact": service.store().path(),
                    "estimator": estimator_details(&model),
                    "evaluation": report,
                }))?;
            } else {
                println!("Trained {} model on {} rows", model.model_kind, model.training_rows);
                match model.estimator() {
                    Estimator::Linear(linear) => {
                        let [year, month] = linear.coefficients();
                        println!(
                            "  Intercept: {:.4}, year: {year:+.4}, month: {month:+.4}",
                            linear.intercept()
                        );
                    }
                    Estimator::RandomForest(forest) => {
                        println!(
                            "  Trees: {} (max depth {})",
                            forest.n_trees(),
                            forest.params().max_depth
                        );
                    }
                }
                println!("  Train RMSE: {:.3}", report.train_rmse);
                println!("  Test RMSE:  {:.3}", report.test_rmse);
                println!("  Train R²:   {:.3}", report.train_r2);
                println!("  Test R²:    {:.3}", report.test_r2);
                println!("Saved to {}", service.store().path().display());
            }
        }

        Commands::Predict { year, month, chart } => {
            let model = service.load_model()?;
            let dataset = load_dataset(&config.data.path)?;
            let result = service.predict(Some(&model), &dataset, year, month)?;

            if let Some(chart) = &chart {
                let series = historical_series(&dataset, month);
                render_prediction_context(&series, &result, chart)?;
            }

            if json {
                print_json(&result)?;
            } else {
                println!(
                    "Predicted average temperature for {}-{:02}: {:.2}°C",
                    result.year, result.month, result.predicted_temperature
                );
                println!("Historical average for month {:02}: {:.2}°C", result.month, result.historical_average);
                println!("{}", result.describe_delta());
            }
            print_chart_path(chart.as_deref(), json);
        }

        Commands::History { month } => {
            let dataset = load_dataset(&config.data.path)?;
            let average = match historical_average(&dataset, month) {
                Ok(average) => Some(average),
                Err(ClimateError::NoData { .. }) => None,
                Err(e) => return Err(e.into()),
            };
            let series = historical_series(&dataset, month);

            if json {
                print_json(&json!({
                    "month": month,
                    "historical_average": average,
                    "series": series
                        .iter()
                        .map(|(year, temperature)| json!({"year": year, "temperature": temperature}))
                        .collect::<Vec<_>>(),
                }))?;
            } else {
                match average {
                    None => println!("No records for month {month}"),
                    Some(average) => {
                        println!("Month {month:02}: historical average {average:.2}°C");
                        for (year, temperature) in &series {
                            println!("  {year}: {temperature:.2}°C");
                        }
                    }
                }
            }
        }

        Commands::Decompose { variable, chart } => {
            let dataset = load_dataset(&config.data.path)?;
            let decomposition = decompose(&dataset, variable)?;
            let pattern = monthly_seasonal_pattern(&decomposition);

            if let Some(chart) = &chart {
                render_seasonal_pattern(&pattern, variable, chart)?;
            }

            if json {
                print_json(&json!({
                    "decomposition": decomposition,
                    "seasonal_pattern": pattern,
                }))?;
            } else {
                println!(
                    "Seasonal pattern of {} ({} months, period {})",
                    variable.label(),
                    decomposition.points.len(),
                    decomposition.period
                );
                for (month, value) in &pattern {
                    println!("  {month:02}: {value:+.3}");
                }
            }
            print_chart_path(chart.as_deref(), json);
        }

        Commands::Correlate { variables } => {
            let variables = if variables.is_empty() {
                ClimateVariable::ALL.to_vec()
            } else {
                variables
            };
            let dataset = load_dataset(&config.data.path)?;
            let matrix = correlation_matrix(&dataset, &variables)?;

            if json {
                print_json(&matrix)?;
            } else {
                print!("{:>18}", "");
                for variable in &matrix.variables {
                    print!("{:>18}", variable.to_string());
                }
                println!();
                for (variable, row) in matrix.variables.iter().zip(&matrix.values) {
                    print!("{:>18}", variable.to_string());
                    for value in row {
                        match value {
                            Some(r) => print!("{r:>18.3}"),
                            None => print!("{:>18}", "n/a"),
                        }
                    }
                    println!();
                }
            }
        }

        Commands::Summary { chart } => {
            let dataset = load_dataset(&config.data.path)?;
            let summaries = describe(&dataset)?;
            let annual = annual_aggregates(&dataset);

            if let Some(chart) = &chart {
                render_annual_trends(&annual, chart)?;
            }

            if json {
                print_json(&json!({
                    "statistics": summaries,
                    "annual": annual,
                }))?;
            } else {
                println!(
                    "{} monthly records, {} years",
                    dataset.len(),
                    annual.len()
                );
                for summary in &summaries {
                    let stats = &summary.statistics;
                    println!(
                        "  {:<28} mean {:>8.2}  std {:>8}  min {:>8.2}  median {:>8.2}  max {:>8.2}",
                        summary.variable.label(),
                        stats.mean,
                        stats.std.map_or_else(|| "n/a".to_string(), |s| format!("{s:.2}")),
                        stats.min,
                        stats.median,
                        stats.max
                    );
                }
            }
            print_chart_path(chart.as_deref(), json);
        }
    }

    Ok(())
}

fn estimator_details(model: &TrainedModel) -> serde_json::Value {
    match model.estimator() {
        Estimator::Linear(linear) => json!({
            "intercept": linear.intercept(),
            "coefficients": linear.coefficients(),
        }),
        Estimator::RandomForest(forest) => {
            let params = forest.params();
            json!({
                "n_trees": forest.n_trees(),
                "max_depth": params.max_depth,
                "seed": params.seed,
            })
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{rendered}");
    Ok(())
}

fn print_chart_path(chart: Option<&Path>, json: bool) {
    if let (Some(chart), false) = (chart, json) {
        println!("Chart written to {}", chart.display());
    }
}
