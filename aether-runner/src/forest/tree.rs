//! CART regression tree with variance-reduction splits.
//!
//! Candidate thresholds are midpoints between consecutive distinct values of
//! a feature. Each feature is scanned once in sorted order with running sums,
//! so a node costs `O(features * n log n)`.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Growth limits for a single tree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features considered per split; `None` means all of them.
    pub max_features: Option<usize>,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: 10,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Leaf {
        value: f64,
        n_samples: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    pub fn depth(&self) -> usize {
        match self {
            Node::Leaf { .. } => 0,
            Node::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    pub fn n_leaves(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Split { left, right, .. } => left.n_leaves() + right.n_leaves(),
        }
    }
}

/// A fitted regression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    root: Node,
    /// Total weighted variance reduction per feature, normalized to sum 1
    /// (all zeros for a single-leaf tree).
    importances: Vec<f64>,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    gain: f64,
}

struct Builder<'a> {
    rows: &'a [Vec<f64>],
    labels: &'a [f64],
    params: TreeParams,
    n_features: usize,
    importances: Vec<f64>,
}

impl RegressionTree {
    /// Fit on the rows selected by `sample` (duplicates allowed, as produced
    /// by bootstrap resampling).
    pub fn fit(
        rows: &[Vec<f64>],
        labels: &[f64],
        sample: Vec<usize>,
        params: TreeParams,
        rng: &mut StdRng,
    ) -> Self {
        let n_features = rows.first().map_or(0, Vec::len);
        let mut builder = Builder {
            rows,
            labels,
            params,
            n_features,
            importances: vec![0.0; n_features],
        };
        let root = builder.build(sample, 0, rng);

        let mut importances = builder.importances;
        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for imp in &mut importances {
                *imp /= total;
            }
        }
        Self { root, importances }
    }

    pub fn predict(&self, x: &[f64]) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { value, .. } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if x[*feature] <= *threshold {
                        left.as_ref()
                    } else {
                        right.as_ref()
                    };
                }
            }
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    pub fn n_leaves(&self) -> usize {
        self.root.n_leaves()
    }

    pub fn feature_importances(&self) -> &[f64] {
        &self.importances
    }
}

impl Builder<'_> {
    fn build(&mut self, indices: Vec<usize>, depth: usize, rng: &mut StdRng) -> Node {
        let n = indices.len();
        let (sum, sum_sq) = indices.iter().fold((0.0, 0.0), |(s, sq), &i| {
            let y = self.labels[i];
            (s + y, sq + y * y)
        });
        let value = if n == 0 { 0.0 } else { sum / n as f64 };
        let sse = sse(sum, sum_sq, n);

        if depth >= self.params.max_depth
            || n < self.params.min_samples_split
            || n < 2 * self.params.min_samples_leaf
            || sse <= 1e-12
        {
            return Node::Leaf {
                value,
                n_samples: n,
            };
        }

        let Some(best) = self.best_split(&indices, sum, sum_sq, rng) else {
            return Node::Leaf {
                value,
                n_samples: n,
            };
        };

        self.importances[best.feature] += best.gain;
        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| self.rows[i][best.feature] <= best.threshold);

        Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left: Box::new(self.build(left, depth + 1, rng)),
            right: Box::new(self.build(right, depth + 1, rng)),
        }
    }

    fn candidate_features(&self, rng: &mut StdRng) -> Vec<usize> {
        let mut features: Vec<usize> = (0..self.n_features).collect();
        match self.params.max_features {
            Some(k) if k < self.n_features => {
                features.shuffle(rng);
                features.truncate(k.max(1));
            }
            _ => {}
        }
        features
    }

    fn best_split(
        &self,
        indices: &[usize],
        sum: f64,
        sum_sq: f64,
        rng: &mut StdRng,
    ) -> Option<BestSplit> {
        let n = indices.len();
        let parent_sse = sse(sum, sum_sq, n);
        let min_leaf = self.params.min_samples_leaf.max(1);
        let mut best: Option<BestSplit> = None;

        for feature in self.candidate_features(rng) {
            let mut pairs: Vec<(f64, f64)> = indices
                .iter()
                .map(|&i| (self.rows[i][feature], self.labels[i]))
                .collect();
            pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

            let (mut left_sum, mut left_sq) = (0.0, 0.0);
            for k in 0..n.saturating_sub(1) {
                let (x, y) = pairs[k];
                left_sum += y;
                left_sq += y * y;

                let next = pairs[k + 1].0;
                if next <= x {
                    continue;
                }
                let n_left = k + 1;
                let n_right = n - n_left;
                if n_left < min_leaf || n_right < min_leaf {
                    continue;
                }

                let child_sse = sse(left_sum, left_sq, n_left)
                    + sse(sum - left_sum, sum_sq - left_sq, n_right);
                let gain = parent_sse - child_sse;
                if gain > best.as_ref().map_or(1e-12, |b| b.gain) {
                    let mut threshold = x + (next - x) / 2.0;
                    if threshold >= next {
                        threshold = x;
                    }
                    best = Some(BestSplit {
                        feature,
                        threshold,
                        gain,
                    });
                }
            }
        }
        best
    }
}

/// Sum of squared deviations from the mean, from running sums.
fn sse(sum: f64, sum_sq: f64, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    (sum_sq - sum * sum / n as f64).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn step_function_is_learned_exactly() {
        let rows: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64]).collect();
        let labels: Vec<f64> = (0..20).map(|i| if i < 10 { 1.0 } else { 5.0 }).collect();
        let tree = RegressionTree::fit(
            &rows,
            &labels,
            (0..20).collect(),
            TreeParams::default(),
            &mut rng(),
        );

        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.predict(&[3.0]), 1.0);
        assert_eq!(tree.predict(&[15.0]), 5.0);
        match tree.root() {
            Node::Split { threshold, .. } => assert!((threshold - 9.5).abs() < 1e-12),
            Node::Leaf { .. } => panic!("expected a split"),
        }
    }

    #[test]
    fn constant_labels_give_single_leaf() {
        let rows: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64, 1.0]).collect();
        let labels = vec![3.0; 10];
        let tree = RegressionTree::fit(
            &rows,
            &labels,
            (0..10).collect(),
            TreeParams::default(),
            &mut rng(),
        );
        assert_eq!(tree.n_leaves(), 1);
        assert_eq!(tree.predict(&[100.0, 0.0]), 3.0);
        assert!(tree.feature_importances().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn depth_limit_is_respected() {
        let rows: Vec<Vec<f64>> = (0..200).map(|i| vec![i as f64]).collect();
        let labels: Vec<f64> = (0..200).map(|i| (i as f64).sin()).collect();
        let params = TreeParams {
            max_depth: 3,
            ..TreeParams::default()
        };
        let tree = RegressionTree::fit(&rows, &labels, (0..200).collect(), params, &mut rng());
        assert!(tree.depth() <= 3);
        assert!(tree.n_leaves() <= 8);
    }

    #[test]
    fn informative_feature_gets_the_importance() {
        let rows: Vec<Vec<f64>> = (0..50).map(|i| vec![1.0, i as f64]).collect();
        let labels: Vec<f64> = (0..50).map(|i| 2.0 * i as f64).collect();
        let tree = RegressionTree::fit(
            &rows,
            &labels,
            (0..50).collect(),
            TreeParams::default(),
            &mut rng(),
        );
        let imp = tree.feature_importances();
        assert_eq!(imp[0], 0.0);
        assert!((imp[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn min_samples_leaf_bounds_leaf_size() {
        let rows: Vec<Vec<f64>> = (0..30).map(|i| vec![i as f64]).collect();
        let labels: Vec<f64> = (0..30).map(|i| (i * i) as f64).collect();
        let params = TreeParams {
            min_samples_leaf: 5,
            ..TreeParams::default()
        };
        let tree = RegressionTree::fit(&rows, &labels, (0..30).collect(), params, &mut rng());

        fn check(node: &Node) {
            match node {
                Node::Leaf { n_samples, .. } => assert!(*n_samples >= 5),
                Node::Split { left, right, .. } => {
                    check(left);
                    check(right);
                }
            }
        }
        check(tree.root());
    }

    #[test]
    fn duplicate_sample_indices_weight_the_mean() {
        let rows = vec![vec![0.0], vec![1.0]];
        let labels = vec![0.0, 10.0];
        let params = TreeParams {
            max_depth: 0,
            ..TreeParams::default()
        };
        let tree = RegressionTree::fit(&rows, &labels, vec![0, 1, 1, 1], params, &mut rng());
        assert!((tree.predict(&[0.0]) - 7.5).abs() < 1e-12);
    }
}
