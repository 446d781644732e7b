use axum::extract::State;
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::v1::response::ApiResponse;
use crate::models::ForecasterStatus;

/// Health data returned inside the v1 envelope.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub database: DatabaseStatus,
    pub forecaster: ForecasterHealth,
    pub sentiment: SentimentModelsStatus,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct DatabaseStatus {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct ForecasterHealth {
    pub status: ForecasterStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_model: Option<String>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct SentimentModelsStatus {
    pub lexicon: bool,
    pub advanced_model: bool,
    pub emotion_model: bool,
}

/// `GET /api/v1/health`
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "health",
    operation_id = "health.check",
    responses(
        (status = 200, description = "Service health status", body = HealthData),
    )
)]
pub async fn health_check(State(state): State<AppState>) -> ApiResponse<HealthData> {
    let database = match state.store.ping().await {
        Ok(()) => DatabaseStatus {
            status: "ok".to_string(),
        },
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            DatabaseStatus {
                status: "error".to_string(),
            }
        }
    };

    let forecaster = ForecasterHealth {
        status: if state.forecaster.is_trained() {
            ForecasterStatus::Trained
        } else {
            ForecasterStatus::NotTrained
        },
        best_model: state
            .forecaster
            .best_model()
            .map(|kind| kind.as_str().to_string()),
    };

    let status = if database.status == "ok" {
        "ok"
    } else {
        "degraded"
    };

    ApiResponse::success(HealthData {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
        forecaster,
        sentiment: SentimentModelsStatus {
            lexicon: true,
            advanced_model: state.scorer.has_advanced_model(),
            emotion_model: state.scorer.has_emotion_model(),
        },
    })
}
