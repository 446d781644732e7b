use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// A point forecast with its 95% interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub business_id: String,
    pub predicted_visitors: i64,
    pub confidence_lower: i64,
    pub confidence_upper: i64,
    pub model_used: String,
}

/// Holdout and cross-validation metrics for one regressor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ModelMetrics {
    pub mae: f64,
    pub mse: f64,
    pub rmse: f64,
    pub r2: f64,
    pub cv_mae: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TrainingReport {
    pub bundle_id: String,
    pub trained_at: DateTime<Utc>,
    pub training_samples: usize,
    pub test_samples: usize,
    pub models: BTreeMap<String, ModelMetrics>,
    pub best_model: String,
    /// False when the bundle could not be written and will not survive a restart.
    pub persisted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ForecasterStatus {
    Trained,
    NotTrained,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ModelPerformance {
    pub status: ForecasterStatus,
    pub models_available: Vec<String>,
    pub metrics: BTreeMap<String, ModelMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trained_at: Option<DateTime<Utc>>,
    pub training_samples: usize,
    pub feature_columns: Vec<String>,
}

impl ModelPerformance {
    pub fn not_trained() -> Self {
        Self {
            status: ForecasterStatus::NotTrained,
            models_available: Vec::new(),
            metrics: BTreeMap::new(),
            bundle_id: None,
            trained_at: None,
            training_samples: 0,
            feature_columns: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AccuracyDetail {
    pub date: NaiveDate,
    pub actual: i64,
    pub predicted: i64,
    pub error: i64,
    pub percentage_error: f64,
}

/// Forecast-vs-actual comparison. Metrics are absent when no dates overlap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AccuracyReport {
    pub data_points: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mae: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mape: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rmse: Option<f64>,
    pub details: Vec<AccuracyDetail>,
}
