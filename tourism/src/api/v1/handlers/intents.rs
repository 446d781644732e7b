//! v1 Intent handlers.

use axum::extract::State;

use crate::api::extractors::AppJson;
use crate::api::v1::dto::{
    ClassifyIntentRequest, ClassifyIntentResponse, ExtractEntitiesRequest,
    ExtractEntitiesResponse,
};
use crate::api::v1::response::{ApiError, ApiResponse};
use crate::api::AppState;
use crate::models::IntentStatistics;

/// `POST /api/v1/intents:classify`
#[utoipa::path(
    post,
    path = "/api/v1/intents:classify",
    tag = "intents",
    operation_id = "intents.classify",
    request_body = ClassifyIntentRequest,
    responses(
        (status = 200, description = "Detected intent", body = ClassifyIntentResponse),
        (status = 400, description = "Invalid request", body = ApiError),
    )
)]
pub async fn classify_intent(
    State(state): State<AppState>,
    AppJson(req): AppJson<ClassifyIntentRequest>,
) -> ApiResponse<ClassifyIntentResponse> {
    let classification = state.intents.classify(&req.text).await;
    let entities = req
        .extract_entities
        .then(|| state.intents.extract_entities(&req.text, classification.intent));

    ApiResponse::success(ClassifyIntentResponse {
        classification,
        entities,
    })
}

/// `POST /api/v1/intents:entities`
#[utoipa::path(
    post,
    path = "/api/v1/intents:entities",
    tag = "intents",
    operation_id = "intents.entities",
    request_body = ExtractEntitiesRequest,
    responses(
        (status = 200, description = "Extracted entities", body = ExtractEntitiesResponse),
        (status = 400, description = "Invalid request", body = ApiError),
    )
)]
pub async fn extract_entities(
    State(state): State<AppState>,
    AppJson(req): AppJson<ExtractEntitiesRequest>,
) -> ApiResponse<ExtractEntitiesResponse> {
    let intent = match req.intent {
        Some(intent) => intent,
        None => state.intents.classify(&req.text).await.intent,
    };

    ApiResponse::success(ExtractEntitiesResponse {
        intent,
        entities: state.intents.extract_entities(&req.text, intent),
    })
}

/// `GET /api/v1/intents/taxonomy`
#[utoipa::path(
    get,
    path = "/api/v1/intents/taxonomy",
    tag = "intents",
    operation_id = "intents.taxonomy",
    responses(
        (status = 200, description = "Intent taxonomy summary", body = IntentStatistics),
    )
)]
pub async fn intent_taxonomy(State(state): State<AppState>) -> ApiResponse<IntentStatistics> {
    ApiResponse::success(state.intents.statistics())
}
