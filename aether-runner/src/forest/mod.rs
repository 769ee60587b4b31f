//! Bagged ensemble of regression trees.
//!
//! Trees are grown in parallel with rayon. Each tree owns an RNG seeded with
//! `seed + tree_index`, so the fitted forest does not depend on thread
//! scheduling.

pub mod tree;

pub use tree::{Node, RegressionTree, TreeParams};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestConfig {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features considered per split; `None` means all of them.
    pub max_features: Option<usize>,
    /// Fit every tree on a bootstrap resample of the training rows.
    pub bootstrap: bool,
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 10,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            bootstrap: true,
            seed: 42,
        }
    }
}

impl ForestConfig {
    fn tree_params(&self) -> TreeParams {
        TreeParams {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
            max_features: self.max_features,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ForestError {
    #[error("cannot fit a forest on zero samples")]
    NoSamples,
    #[error("{rows} feature rows but {labels} labels")]
    LengthMismatch { rows: usize, labels: usize },
    #[error("row {row} has {found} features, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("forest needs at least one tree")]
    NoTrees,
}

/// A fitted forest. Predictions are the mean of the tree predictions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    config: ForestConfig,
    trees: Vec<RegressionTree>,
    n_features: usize,
    importances: Vec<f64>,
}

impl RandomForest {
    pub fn fit(
        config: &ForestConfig,
        rows: &[Vec<f64>],
        labels: &[f64],
    ) -> Result<Self, ForestError> {
        if config.n_trees == 0 {
            return Err(ForestError::NoTrees);
        }
        if rows.is_empty() {
            return Err(ForestError::NoSamples);
        }
        if rows.len() != labels.len() {
            return Err(ForestError::LengthMismatch {
                rows: rows.len(),
                labels: labels.len(),
            });
        }
        let n_features = rows[0].len();
        if let Some((row, r)) = rows
            .iter()
            .enumerate()
            .find(|(_, r)| r.len() != n_features)
        {
            return Err(ForestError::RaggedRow {
                row,
                expected: n_features,
                found: r.len(),
            });
        }

        let n = rows.len();
        let params = config.tree_params();
        let trees: Vec<RegressionTree> = (0..config.n_trees)
            .into_par_iter()
            .map(|i| {
                let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(i as u64));
                let sample: Vec<usize> = if config.bootstrap {
                    (0..n).map(|_| rng.gen_range(0..n)).collect()
                } else {
                    (0..n).collect()
                };
                RegressionTree::fit(rows, labels, sample, params, &mut rng)
            })
            .collect();

        let mut importances = vec![0.0; n_features];
        for tree in &trees {
            for (acc, &imp) in importances.iter_mut().zip(tree.feature_importances()) {
                *acc += imp;
            }
        }
        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for imp in &mut importances {
                *imp /= total;
            }
        }

        tracing::debug!(
            trees = trees.len(),
            samples = n,
            features = n_features,
            "forest fitted"
        );

        Ok(Self {
            config: config.clone(),
            trees,
            n_features,
            importances,
        })
    }

    pub fn predict_one(&self, x: &[f64]) -> f64 {
        let total: f64 = self.trees.iter().map(|t| t.predict(x)).sum();
        total / self.trees.len() as f64
    }

    pub fn predict(&self, rows: &[Vec<f64>]) -> Vec<f64> {
        rows.par_iter().map(|x| self.predict_one(x)).collect()
    }

    /// Mean of the per-tree normalized importances, renormalized to sum 1.
    pub fn feature_importances(&self) -> &[f64] {
        &self.importances
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_data(n: usize) -> (Vec<Vec<f64>>, Vec<f64>) {
        let rows: Vec<Vec<f64>> = (0..n)
            .map(|i| vec![i as f64, ((i * 7) % 13) as f64])
            .collect();
        let labels = rows.iter().map(|r| 3.0 * r[0] + 1.0).collect();
        (rows, labels)
    }

    fn small_config() -> ForestConfig {
        ForestConfig {
            n_trees: 10,
            ..ForestConfig::default()
        }
    }

    #[test]
    fn default_matches_documented_hyperparameters() {
        let c = ForestConfig::default();
        assert_eq!(c.n_trees, 100);
        assert_eq!(c.max_depth, 10);
        assert_eq!(c.seed, 42);
        assert!(c.bootstrap);
    }

    #[test]
    fn fit_is_deterministic_for_a_seed() {
        let (rows, labels) = linear_data(80);
        let a = RandomForest::fit(&small_config(), &rows, &labels).unwrap();
        let b = RandomForest::fit(&small_config(), &rows, &labels).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn fits_a_linear_trend_in_sample() {
        let (rows, labels) = linear_data(100);
        let forest = RandomForest::fit(&small_config(), &rows, &labels).unwrap();
        let preds = forest.predict(&rows);
        let mae: f64 = preds
            .iter()
            .zip(&labels)
            .map(|(p, y)| (p - y).abs())
            .sum::<f64>()
            / labels.len() as f64;
        assert!(mae < 5.0, "in-sample MAE too high: {mae}");
    }

    #[test]
    fn importances_sum_to_one_and_favor_signal() {
        let (rows, labels) = linear_data(100);
        let forest = RandomForest::fit(&small_config(), &rows, &labels).unwrap();
        let imp = forest.feature_importances();
        assert!((imp.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(imp[0] > imp[1]);
    }

    #[test]
    fn prediction_stays_within_label_range() {
        let (rows, labels) = linear_data(60);
        let forest = RandomForest::fit(&small_config(), &rows, &labels).unwrap();
        let p = forest.predict_one(&[1_000.0, 0.0]);
        assert!(p <= 3.0 * 59.0 + 1.0 + 1e-9);
    }

    #[test]
    fn rejects_bad_input() {
        let cfg = small_config();
        assert_eq!(
            RandomForest::fit(&cfg, &[], &[]).unwrap_err(),
            ForestError::NoSamples
        );
        assert!(matches!(
            RandomForest::fit(&cfg, &[vec![1.0]], &[1.0, 2.0]),
            Err(ForestError::LengthMismatch { .. })
        ));
        assert!(matches!(
            RandomForest::fit(&cfg, &[vec![1.0], vec![1.0, 2.0]], &[1.0, 2.0]),
            Err(ForestError::RaggedRow { row: 1, .. })
        ));
        let none = ForestConfig {
            n_trees: 0,
            ..cfg
        };
        assert_eq!(
            RandomForest::fit(&none, &[vec![1.0]], &[1.0]).unwrap_err(),
            ForestError::NoTrees
        );
    }
}
