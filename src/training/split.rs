//! Deterministic train/test splitting

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::models::{ClimateDataset, ClimateRecord};
use crate::{ClimateError, Result};

/// Seed used when the caller does not provide one
pub const DEFAULT_SEED: u64 = 42;

/// Split a dataset into `(train, test)` with the default seed
pub fn split(
    dataset: &ClimateDataset,
    test_fraction: f64,
) -> Result<(Vec<ClimateRecord>, Vec<ClimateRecord>)> {
    split_with_seed(dataset, test_fraction, DEFAULT_SEED)
}

/// Split a dataset into `(train, test)`.
///
/// Rows are shuffled with a seeded generator and the first
/// `ceil(n * test_fraction)` rows become the test set, so the same seed
/// always yields the same partition.
pub fn split_with_seed(
    dataset: &ClimateDataset,
    test_fraction: f64,
    seed: u64,
) -> Result<(Vec<ClimateRecord>, Vec<ClimateRecord>)> {
    if !test_fraction.is_finite() || test_fraction <= 0.0 || test_fraction >= 1.0 {
        return Err(ClimateError::invalid_parameter(format!(
            "test fraction must be strictly between 0 and 1, got {test_fraction}"
        )));
    }
    if dataset.is_empty() {
        return Err(ClimateError::empty_dataset("cannot split an empty dataset"));
    }

    let n = dataset.len();
    let n_test = ((n as f64) * test_fraction).ceil() as usize;
    let n_test = n_test.min(n);

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let records = dataset.records();
    let test = indices[..n_test].iter().map(|&i| records[i].clone()).collect();
    let train = indices[n_test..].iter().map(|&i| records[i].clone()).collect();

    debug!(
        "Split {} rows into {} train / {} test (seed {})",
        n,
        n - n_test,
        n_test,
        seed
    );
    Ok((train, test))
}
