//! Regressors used by the demand forecaster.

mod boosting;
mod forest;
mod linear;
mod tree;

pub use boosting::GradientBoosting;
pub use forest::RandomForest;
pub use linear::LinearRegression;
pub use tree::{DecisionTree, TreeParams};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, TourismError};

pub trait Estimator {
    fn predict_row(&self, row: &[f64]) -> f64;

    fn predict(&self, rows: &[Vec<f64>]) -> Vec<f64> {
        rows.iter().map(|row| self.predict_row(row)).collect()
    }

    /// Per-member predictions for ensembles whose members each predict the target.
    fn member_predictions(&self, _row: &[f64]) -> Option<Vec<f64>> {
        None
    }

    /// Normalized impurity-decrease importances, for tree-based models.
    fn feature_importances(&self) -> Option<&[f64]> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    RandomForest,
    GradientBoosting,
    LinearRegression,
}

impl ModelKind {
    pub const ALL: [ModelKind; 3] = [
        ModelKind::RandomForest,
        ModelKind::GradientBoosting,
        ModelKind::LinearRegression,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::RandomForest => "random_forest",
            ModelKind::GradientBoosting => "gradient_boosting",
            ModelKind::LinearRegression => "linear_regression",
        }
    }

    pub fn fit(&self, x: &[Vec<f64>], y: &[f64], params: &TrainingParams) -> Result<Regressor> {
        Ok(match self {
            ModelKind::RandomForest => {
                Regressor::RandomForest(RandomForest::fit(x, y, params.n_trees, params.seed))
            }
            ModelKind::GradientBoosting => Regressor::GradientBoosting(GradientBoosting::fit(
                x,
                y,
                params.boosting_stages,
                params.learning_rate,
                params.max_depth,
            )),
            ModelKind::LinearRegression => {
                Regressor::LinearRegression(LinearRegression::fit(x, y)?)
            }
        })
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKind {
    type Err = TourismError;

    fn from_str(s: &str) -> Result<Self> {
        ModelKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                TourismError::Validation(format!(
                    "Unknown model '{}'. Available: random_forest, gradient_boosting, linear_regression",
                    s
                ))
            })
    }
}

/// Hyperparameters shared by a training run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingParams {
    pub n_trees: usize,
    pub boosting_stages: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub seed: u64,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            boosting_stages: 100,
            learning_rate: 0.1,
            max_depth: 3,
            seed: 42,
        }
    }
}

/// A fitted regressor as stored in a bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Regressor {
    RandomForest(RandomForest),
    GradientBoosting(GradientBoosting),
    LinearRegression(LinearRegression),
}

impl Regressor {
    pub fn kind(&self) -> ModelKind {
        match self {
            Regressor::RandomForest(_) => ModelKind::RandomForest,
            Regressor::GradientBoosting(_) => ModelKind::GradientBoosting,
            Regressor::LinearRegression(_) => ModelKind::LinearRegression,
        }
    }

    fn estimator(&self) -> &dyn Estimator {
        match self {
            Regressor::RandomForest(m) => m,
            Regressor::GradientBoosting(m) => m,
            Regressor::LinearRegression(m) => m,
        }
    }
}

impl Estimator for Regressor {
    fn predict_row(&self, row: &[f64]) -> f64 {
        self.estimator().predict_row(row)
    }

    fn member_predictions(&self, row: &[f64]) -> Option<Vec<f64>> {
        self.estimator().member_predictions(row)
    }

    fn feature_importances(&self) -> Option<&[f64]> {
        self.estimator().feature_importances()
    }
}
