//! Climate dataset loading
//!
//! Reads the historical climate table from delimited text, normalizes the
//! header names and validates every numeric cell before building a
//! [`ClimateDataset`].

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, info, instrument};

use crate::models::{ClimateDataset, ClimateRecord};
use crate::{ClimateError, Result};

const YEAR: &[&str] = &["year"];
const MONTH: &[&str] = &["month"];
const AVERAGE_TEMPERATURE: &[&str] = &[
    "average_temperature_c",
    "average_temperature",
    "avg_temperature",
    "temperature",
];
const MAX_TEMPERATURE: &[&str] = &["max_temperature_c", "max_temperature"];
const MIN_TEMPERATURE: &[&str] = &["min_temperature_c", "min_temperature"];
const TOTAL_RAINFALL: &[&str] = &["total_rainfall_mm", "total_rainfall", "rainfall"];

/// Positions of the required columns within a header row
#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    year: usize,
    month: usize,
    average_temperature: usize,
    max_temperature: usize,
    min_temperature: usize,
    total_rainfall: usize,
}

fn normalize_header(name: &str) -> String {
    name.trim()
        .trim_start_matches('\u{feff}')
        .to_ascii_lowercase()
        .replace([' ', '-'], "_")
}

impl ColumnMap {
    fn resolve(headers: &StringRecord) -> Result<Self> {
        let normalized: Vec<String> = headers.iter().map(normalize_header).collect();
        let find = |canonical: &str, aliases: &[&str]| -> Result<usize> {
            aliases
                .iter()
                .find_map(|alias| normalized.iter().position(|h| h == alias))
                .ok_or_else(|| {
                    ClimateError::malformed(format!("missing required column '{canonical}'"))
                })
        };

        Ok(Self {
            year: find("Year", YEAR)?,
            month: find("Month", MONTH)?,
            average_temperature: find("Average_Temperature_C", AVERAGE_TEMPERATURE)?,
            max_temperature: find("Max_Temperature_C", MAX_TEMPERATURE)?,
            min_temperature: find("Min_Temperature_C", MIN_TEMPERATURE)?,
            total_rainfall: find("Total_Rainfall_mm", TOTAL_RAINFALL)?,
        })
    }

    fn parse_row(&self, row: &StringRecord, line: usize) -> Result<ClimateRecord> {
        let year = parse_integer(row, self.year, "Year", line)?;
        let month = parse_integer(row, self.month, "Month", line)?;
        let month = u32::try_from(month)
            .ok()
            .filter(|m| (1..=12).contains(m))
            .ok_or_else(|| {
                ClimateError::malformed(format!("line {line}: month {month} is outside 1..=12"))
            })?;
        let year = i32::try_from(year).map_err(|_| {
            ClimateError::malformed(format!("line {line}: year {year} is out of range"))
        })?;

        Ok(ClimateRecord {
            year,
            month,
            average_temperature: parse_number(row, self.average_temperature, "Average_Temperature_C", line)?,
            max_temperature: parse_number(row, self.max_temperature, "Max_Temperature_C", line)?,
            min_temperature: parse_number(row, self.min_temperature, "Min_Temperature_C", line)?,
            total_rainfall: parse_number(row, self.total_rainfall, "Total_Rainfall_mm", line)?,
        })
    }
}

fn cell<'r>(row: &'r StringRecord, index: usize, column: &str, line: usize) -> Result<&'r str> {
    row.get(index)
        .ok_or_else(|| ClimateError::malformed(format!("line {line}: missing value for '{column}'")))
}

fn parse_number(row: &StringRecord, index: usize, column: &str, line: usize) -> Result<f64> {
    let raw = cell(row, index, column, line)?;
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| {
            ClimateError::malformed(format!(
                "line {line}: non-numeric value '{raw}' in column '{column}'"
            ))
        })
}

/// Whole numbers written as "2001" or "2001.0" are both accepted
fn parse_integer(row: &StringRecord, index: usize, column: &str, line: usize) -> Result<i64> {
    let raw = cell(row, index, column, line)?;
    if let Ok(value) = raw.parse::<i64>() {
        return Ok(value);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && v.fract() == 0.0)
        .map(|v| v as i64)
        .ok_or_else(|| {
            ClimateError::malformed(format!(
                "line {line}: expected a whole number in column '{column}', got '{raw}'"
            ))
        })
}

/// Load the climate table from a CSV file
#[instrument(level = "debug", skip_all)]
pub fn load_dataset<P: AsRef<Path>>(path: P) -> Result<ClimateDataset> {
    let file = File::open(path.as_ref())?;
    let dataset = read_dataset(BufReader::new(file))?;
    info!(
        "Loaded {} climate records from {}",
        dataset.len(),
        path.as_ref().display()
    );
    Ok(dataset)
}

/// Parse a climate table from any CSV source
pub fn read_dataset<R: Read>(source: R) -> Result<ClimateDataset> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| ClimateError::malformed(format!("unreadable header row: {e}")))?
        .clone();
    let columns = ColumnMap::resolve(&headers)?;
    debug!("Resolved dataset columns: {:?}", columns);

    let mut records = Vec::new();
    for (index, row) in reader.records().enumerate() {
        // header is line 1
        let line = index + 2;
        let row = row.map_err(|e| ClimateError::malformed(format!("line {line}: {e}")))?;
        records.push(columns.parse_row(&row, line)?);
    }

    ClimateDataset::new(records)
}
