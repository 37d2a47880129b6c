//! Synthetic datasets shared by unit tests

use std::f64::consts::PI;

use crate::models::{ClimateDataset, ClimateRecord};

pub fn record(year: i32, month: u32, temperature: f64) -> ClimateRecord {
    ClimateRecord {
        year,
        month,
        average_temperature: temperature,
        max_temperature: temperature + 6.0,
        min_temperature: temperature - 6.0,
        total_rainfall: 80.0,
    }
}

/// Monthly data with a warming trend and a seasonal cycle peaking in March
pub fn synthetic_dataset(first_year: i32, last_year: i32) -> ClimateDataset {
    let records = (first_year..=last_year)
        .flat_map(|year| {
            (1..=12).map(move |month| {
                let seasonal = 2.0 * (2.0 * PI * (f64::from(month) - 3.0) / 12.0).cos();
                let trend = 0.03 * f64::from(year - 2000);
                let temperature = 24.0 + trend + seasonal;
                ClimateRecord {
                    year,
                    month,
                    average_temperature: temperature,
                    max_temperature: temperature + 5.5 + 0.1 * f64::from(month),
                    min_temperature: temperature - 5.0,
                    total_rainfall: 90.0 + 60.0 * (2.0 * PI * (f64::from(month) - 4.0) / 12.0).cos()
                        - 0.5 * f64::from(year - 2000),
                }
            })
        })
        .collect();
    ClimateDataset::new(records).expect("synthetic records are valid")
}

/// Temperature exactly linear in `[year, month]`
pub fn linear_dataset(first_year: i32, last_year: i32) -> ClimateDataset {
    let records = (first_year..=last_year)
        .flat_map(|year| {
            (1..=12).map(move |month| {
                record(
                    year,
                    month,
                    20.0 + 0.05 * f64::from(year - 2000) + 0.3 * f64::from(month),
                )
            })
        })
        .collect();
    ClimateDataset::new(records).expect("linear records are valid")
}
