use serde::{Deserialize, Serialize};

use super::tree::{normalize, DecisionTree, TreeParams};
use super::Estimator;

/// Least-squares gradient boosting over shallow regression trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoosting {
    init: f64,
    learning_rate: f64,
    stages: Vec<DecisionTree>,
    importances: Vec<f64>,
}

impl GradientBoosting {
    pub fn fit(
        x: &[Vec<f64>],
        y: &[f64],
        n_stages: usize,
        learning_rate: f64,
        max_depth: usize,
    ) -> Self {
        let n = y.len();
        let n_features = x.first().map_or(0, Vec::len);
        let init = if n == 0 {
            0.0
        } else {
            y.iter().sum::<f64>() / n as f64
        };
        let params = TreeParams {
            max_depth: Some(max_depth),
            ..Default::default()
        };
        let samples: Vec<usize> = (0..n).collect();

        let mut current = vec![init; n];
        let mut stages = Vec::with_capacity(n_stages);
        let mut importances = vec![0.0; n_features];

        for _ in 0..n_stages {
            let residuals: Vec<f64> = y.iter().zip(&current).map(|(t, f)| t - f).collect();
            let tree = DecisionTree::fit(x, &residuals, &samples, &params);
            for (fitted, row) in current.iter_mut().zip(x) {
                *fitted += learning_rate * tree.predict_row(row);
            }
            for (total, value) in importances.iter_mut().zip(tree.feature_importances()) {
                *total += value;
            }
            stages.push(tree);
        }

        Self {
            init,
            learning_rate,
            stages,
            importances: normalize(importances),
        }
    }

    pub fn n_stages(&self) -> usize {
        self.stages.len()
    }
}

impl Estimator for GradientBoosting {
    fn predict_row(&self, row: &[f64]) -> f64 {
        self.stages
            .iter()
            .fold(self.init, |acc, tree| acc + self.learning_rate * tree.predict_row(row))
    }

    fn feature_importances(&self) -> Option<&[f64]> {
        Some(&self.importances)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boosting_converges_on_training_data() {
        let x: Vec<Vec<f64>> = (0..30).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = (0..30).map(|i| 2.0 * i as f64 + 5.0).collect();
        let model = GradientBoosting::fit(&x, &y, 100, 0.1, 3);

        assert_eq!(model.n_stages(), 100);
        let mae: f64 = x
            .iter()
            .zip(&y)
            .map(|(row, target)| (model.predict_row(row) - target).abs())
            .sum::<f64>()
            / y.len() as f64;
        assert!(mae < 2.0, "training MAE too high: {mae}");
    }

    #[test]
    fn test_zero_stages_predicts_mean() {
        let x = vec![vec![0.0], vec![1.0]];
        let y = vec![10.0, 20.0];
        let model = GradientBoosting::fit(&x, &y, 0, 0.1, 3);
        assert_eq!(model.predict_row(&[5.0]), 15.0);
        assert_eq!(model.member_predictions(&[5.0]), None);
    }

    #[test]
    fn test_boosting_importances_follow_signal() {
        let x: Vec<Vec<f64>> = (0..20).map(|i| vec![0.0, (i % 2) as f64]).collect();
        let y: Vec<f64> = (0..20).map(|i| if i % 2 == 0 { 1.0 } else { 3.0 }).collect();
        let model = GradientBoosting::fit(&x, &y, 10, 0.1, 3);
        assert_eq!(model.feature_importances().unwrap(), &[0.0, 1.0]);
    }
}
