//! Forecasting request DTOs.

use serde::Deserialize;

use crate::models::{BaseConditions, PartialObservation};

/// Largest row count accepted by `POST /v1/forecasting:predict`.
pub const MAX_PREDICT_ROWS: usize = 1_000;

fn default_forecast_days() -> u32 {
    30
}

fn default_days_back() -> i64 {
    30
}

/// Request body for `POST /v1/forecasting:train`. Send `{}` to train on every business.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
pub struct TrainRequest {
    #[serde(default)]
    pub business_id: Option<String>,
}

/// Request body for `POST /v1/forecasting:predict`.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct PredictRequest {
    pub observations: Vec<PartialObservation>,
    /// Regressor name. Defaults to the configured model.
    #[serde(default)]
    pub model: Option<String>,
}

/// Request body for `POST /v1/businesses/{businessId}/forecast`.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct ForecastRequest {
    /// Days ahead to forecast (1 to 365, default 30).
    #[serde(default = "default_forecast_days")]
    pub days: u32,
    #[serde(default)]
    pub base_conditions: BaseConditions,
}

/// Query parameters for `GET /v1/businesses/{businessId}/forecast/accuracy`.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema, utoipa::IntoParams)]
pub struct AccuracyQuery {
    #[serde(default = "default_days_back")]
    pub days_back: i64,
}

/// Query parameters for `GET /v1/forecasting/importance`.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema, utoipa::IntoParams)]
pub struct ImportanceQuery {
    /// Regressor name. Defaults to `random_forest`.
    pub model: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forecast_request_defaults() {
        let req: ForecastRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.days, 30);
        assert_eq!(req.base_conditions, BaseConditions::default());

        let req: ForecastRequest = serde_json::from_str(
            r#"{"days": 7, "base_conditions": {"average_temperature": 21.5}}"#,
        )
        .unwrap();
        assert_eq!(req.days, 7);
        assert_eq!(req.base_conditions.temperature, Some(21.5));
    }
}
