use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::features::{CategoryEncoders, StandardScaler, VisitorHistory, FEATURE_COLUMNS};
use super::regressors::{ModelKind, Regressor};
use crate::error::{Result, TourismError};
use crate::models::ModelMetrics;

/// Bumped whenever the persisted layout changes. Older blobs load as not-trained.
pub const BUNDLE_FORMAT_VERSION: u32 = 1;

/// Everything needed to predict: regressors plus the exact preprocessing they were fitted with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModelSet {
    pub bundle_id: String,
    pub version: u32,
    pub trained_at: DateTime<Utc>,
    pub feature_columns: Vec<String>,
    pub scaler: StandardScaler,
    pub encoders: CategoryEncoders,
    pub models: BTreeMap<String, Regressor>,
    pub performance: BTreeMap<String, ModelMetrics>,
    /// Recent visitor counts per business, used for lag features at predict time.
    pub history: VisitorHistory,
    pub training_samples: usize,
    pub test_samples: usize,
}

impl TrainedModelSet {
    pub fn to_blob(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decodes and validates a persisted bundle.
    pub fn from_blob(blob: &[u8]) -> Result<Self> {
        let bundle: Self = serde_json::from_slice(blob)
            .map_err(|e| TourismError::NotTrained(format!("undecodable model bundle: {e}")))?;
        bundle.validate()?;
        Ok(bundle)
    }

    /// Checks that every component a prediction needs is present and consistent.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| Err(TourismError::NotTrained(format!("incomplete model bundle: {reason}")));

        if self.version != BUNDLE_FORMAT_VERSION {
            return invalid(format!(
                "format version {} (expected {})",
                self.version, BUNDLE_FORMAT_VERSION
            ));
        }
        if self.feature_columns.iter().map(String::as_str).ne(FEATURE_COLUMNS) {
            return invalid("feature columns do not match".to_string());
        }
        if self.scaler.dims() != FEATURE_COLUMNS.len()
            || self.scaler.scales.len() != FEATURE_COLUMNS.len()
        {
            return invalid(format!("scaler has {} columns", self.scaler.dims()));
        }
        if self.models.is_empty() {
            return invalid("no models".to_string());
        }
        for (name, model) in &self.models {
            if model.kind().as_str() != name {
                return invalid(format!("model '{name}' holds a {}", model.kind()));
            }
            if !self.performance.contains_key(name) {
                return invalid(format!("missing metrics for '{name}'"));
            }
        }
        Ok(())
    }

    pub fn model(&self, name: &str) -> Result<(ModelKind, &Regressor)> {
        let kind: ModelKind = name.parse()?;
        let model = self.models.get(kind.as_str()).ok_or_else(|| {
            TourismError::Validation(format!("Model '{name}' is not part of the trained bundle"))
        })?;
        Ok((kind, model))
    }

    pub fn model_names(&self) -> Vec<String> {
        self.models.keys().cloned().collect()
    }

    /// Lowest holdout MAE. Ties go to the earlier model kind.
    pub fn best_model(&self) -> Option<ModelKind> {
        ModelKind::ALL
            .into_iter()
            .filter_map(|kind| self.performance.get(kind.as_str()).map(|m| (kind, m.mae)))
            .fold(None, |best: Option<(ModelKind, f64)>, (kind, mae)| match best {
                Some((_, best_mae)) if best_mae <= mae => best,
                _ => Some((kind, mae)),
            })
            .map(|(kind, _)| kind)
    }
}
