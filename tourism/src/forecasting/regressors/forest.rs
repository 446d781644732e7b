use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::tree::{normalize, DecisionTree, TreeParams};
use super::Estimator;

/// Bagged ensemble of fully grown regression trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    importances: Vec<f64>,
}

impl RandomForest {
    /// Each tree sees a bootstrap sample of size `n` drawn with replacement.
    /// The same `seed` always yields the same forest.
    pub fn fit(x: &[Vec<f64>], y: &[f64], n_trees: usize, seed: u64) -> Self {
        let n = y.len();
        let n_features = x.first().map_or(0, Vec::len);
        let params = TreeParams::default();
        let mut seeds = StdRng::seed_from_u64(seed);

        let trees: Vec<DecisionTree> = (0..n_trees.max(1))
            .map(|_| {
                let mut rng = StdRng::seed_from_u64(seeds.gen());
                let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                DecisionTree::fit(x, y, &sample, &params)
            })
            .collect();

        let mut importances = vec![0.0; n_features];
        for tree in &trees {
            for (total, value) in importances.iter_mut().zip(tree.feature_importances()) {
                *total += value;
            }
        }
        let count = trees.len() as f64;
        importances.iter_mut().for_each(|v| *v /= count);

        Self {
            trees,
            importances: normalize(importances),
        }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Estimator for RandomForest {
    fn predict_row(&self, row: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let total: f64 = self.trees.iter().map(|t| t.predict_row(row)).sum();
        total / self.trees.len() as f64
    }

    fn member_predictions(&self, row: &[f64]) -> Option<Vec<f64>> {
        Some(self.trees.iter().map(|t| t.predict_row(row)).collect())
    }

    fn feature_importances(&self) -> Option<&[f64]> {
        Some(&self.importances)
    }
}
