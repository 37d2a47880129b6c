//! Random forest regression
//!
//! Bagged CART regression trees grown on bootstrap samples with squared-error
//! splits. Every tree draws its own seed from a master generator, so a forest
//! trained twice with the same parameters is identical.

use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{FeatureVector, Regressor, features, target};
use crate::models::ClimateRecord;
use crate::{ClimateError, Result};

/// Minimum number of samples a node needs before it may be split
const MIN_SAMPLES_SPLIT: usize = 2;

/// Forest hyper-parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_depth: usize,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 200,
            max_depth: 10,
            seed: 42,
        }
    }
}

/// Tree node stored in a flat arena; children are indices into it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct RegressionTree {
    nodes: Vec<Node>,
}

/// Training rows as parallel feature/target columns
struct Samples {
    x: Vec<FeatureVector>,
    y: Vec<f64>,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    score: f64,
}

impl RegressionTree {
    fn grow(samples: &Samples, indices: Vec<usize>, max_depth: usize) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.build(samples, indices, 0, max_depth);
        tree
    }

    /// Builds the subtree for `indices` and returns its node index
    fn build(&mut self, samples: &Samples, indices: Vec<usize>, depth: usize, max_depth: usize) -> usize {
        let mean = indices.iter().map(|&i| samples.y[i]).sum::<f64>() / indices.len() as f64;

        let split = if depth < max_depth && indices.len() >= MIN_SAMPLES_SPLIT {
            best_split(samples, &indices)
        } else {
            None
        };

        let Some(split) = split else {
            self.nodes.push(Node::Leaf { value: mean });
            return self.nodes.len() - 1;
        };

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| samples.x[i][split.feature] <= split.threshold);

        // reserve the slot so the parent precedes its children
        let slot = self.nodes.len();
        self.nodes.push(Node::Leaf { value: mean });
        let left = self.build(samples, left_rows, depth + 1, max_depth);
        let right = self.build(samples, right_rows, depth + 1, max_depth);
        self.nodes[slot] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        slot
    }

    fn predict(&self, x: &FeatureVector) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if x[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

/// Best squared-error split over both features, or `None` if every
/// candidate leaves the node impurity unchanged.
///
/// Maximizing `sum_l² / n_l + sum_r² / n_r` is equivalent to minimizing
/// the children's total squared error.
fn best_split(samples: &Samples, indices: &[usize]) -> Option<BestSplit> {
    let n = indices.len() as f64;
    let total: f64 = indices.iter().map(|&i| samples.y[i]).sum();
    let parent_score = total * total / n;
    let mut best: Option<BestSplit> = None;

    for feature in 0..2 {
        let mut sorted = indices.to_vec();
        sorted.sort_by(|&a, &b| samples.x[a][feature].total_cmp(&samples.x[b][feature]));

        let mut left_sum = 0.0;
        for pos in 0..sorted.len() - 1 {
            left_sum += samples.y[sorted[pos]];
            let current = samples.x[sorted[pos]][feature];
            let next = samples.x[sorted[pos + 1]][feature];
            if current == next {
                continue;
            }

            let n_left = (pos + 1) as f64;
            let n_right = n - n_left;
            let right_sum = total - left_sum;
            let score = left_sum * left_sum / n_left + right_sum * right_sum / n_right;

            if best.as_ref().is_none_or(|b| score > b.score) {
                best = Some(BestSplit {
                    feature,
                    threshold: (current + next) / 2.0,
                    score,
                });
            }
        }
    }

    best.filter(|b| b.score > parent_score + 1e-12 * parent_score.abs().max(1.0))
}

/// Ensemble of regression trees averaged at prediction time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    params: ForestParams,
    trees: Vec<RegressionTree>,
}

impl RandomForest {
    pub fn fit(records: &[ClimateRecord], params: ForestParams) -> Result<Self> {
        if records.is_empty() {
            return Err(ClimateError::empty_dataset(
                "random forest needs at least one training row",
            ));
        }
        if params.n_trees == 0 {
            return Err(ClimateError::invalid_parameter(
                "random forest needs at least one tree",
            ));
        }

        let samples = Samples {
            x: records.iter().map(features).collect(),
            y: records.iter().map(target).collect(),
        };
        let n = records.len();
        let mut master = StdRng::seed_from_u64(params.seed);

        let trees: Vec<RegressionTree> = (0..params.n_trees)
            .map(|_| {
                let mut rng = StdRng::seed_from_u64(master.random::<u64>());
                let bootstrap: Vec<usize> = (0..n).map(|_| rng.random_range(0..n)).collect();
                RegressionTree::grow(&samples, bootstrap, params.max_depth)
            })
            .collect();

        debug!(
            "Grew {} trees (max depth {}) on {} rows",
            trees.len(),
            params.max_depth,
            n
        );
        Ok(Self { params, trees })
    }

    pub fn params(&self) -> ForestParams {
        self.params
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Regressor for RandomForest {
    fn predict_one(&self, x: &FeatureVector) -> f64 {
        let sum: f64 = self.trees.iter().map(|tree| tree.predict(x)).sum();
        sum / self.trees.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{record, synthetic_dataset};

    fn small_params() -> ForestParams {
        ForestParams {
            n_trees: 25,
            max_depth: 6,
            seed: 7,
        }
    }

    #[test]
    fn test_forest_is_deterministic() {
        let dataset = synthetic_dataset(2000, 2005);
        let a = RandomForest::fit(dataset.records(), small_params()).unwrap();
        let b = RandomForest::fit(dataset.records(), small_params()).unwrap();

        assert_eq!(a, b);
        assert_eq!(
            a.predict_one(&[2025.0, 6.0]).to_bits(),
            b.predict_one(&[2025.0, 6.0]).to_bits()
        );
    }

    #[test]
    fn test_forest_tracks_seasonal_signal() {
        let dataset = synthetic_dataset(2000, 2009);
        let forest = RandomForest::fit(dataset.records(), small_params()).unwrap();

        // synthetic data peaks around March and bottoms out around September
        let march = forest.predict_one(&[2005.0, 3.0]);
        let september = forest.predict_one(&[2005.0, 9.0]);
        assert!(march > september + 1.0);
    }

    #[test]
    fn test_constant_target_gives_single_leaf() {
        let records: Vec<_> = (1..=12).map(|m| record(2010, m, 24.0)).collect();
        let forest = RandomForest::fit(&records, small_params()).unwrap();
        assert!(forest.trees.iter().all(|t| t.nodes.len() == 1));
        assert_eq!(forest.predict_one(&[2040.0, 1.0]), 24.0);
    }

    #[test]
    fn test_depth_zero_predicts_bootstrap_means() {
        let dataset = synthetic_dataset(2000, 2001);
        let params = ForestParams {
            max_depth: 0,
            ..small_params()
        };
        let forest = RandomForest::fit(dataset.records(), params).unwrap();
        assert!(forest.trees.iter().all(|t| t.nodes.len() == 1));
    }

    #[test]
    fn test_empty_training_set() {
        assert!(matches!(
            RandomForest::fit(&[], ForestParams::default()),
            Err(ClimateError::EmptyDataset { .. })
        ));
    }

    #[test]
    fn test_zero_trees_rejected() {
        let dataset = synthetic_dataset(2000, 2000);
        let params = ForestParams {
            n_trees: 0,
            ..ForestParams::default()
        };
        assert!(matches!(
            RandomForest::fit(dataset.records(), params),
            Err(ClimateError::InvalidParameter { .. })
        ));
    }
}
