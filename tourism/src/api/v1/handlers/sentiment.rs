//! v1 Sentiment handlers.

use axum::extract::State;

use crate::api::extractors::AppJson;
use crate::api::v1::dto::{
    check_batch_size, AnalyzeSentimentRequest, BatchSentimentRequest, MAX_SENTIMENT_BATCH,
};
use crate::api::v1::response::{ApiError, ApiResponse, ResponseMeta};
use crate::api::AppState;
use crate::models::{AggregateInsights, SentimentResult};

/// `POST /api/v1/sentiment:analyze`
#[utoipa::path(
    post,
    path = "/api/v1/sentiment:analyze",
    tag = "sentiment",
    operation_id = "sentiment.analyze",
    request_body = AnalyzeSentimentRequest,
    responses(
        (status = 200, description = "Sentiment scored", body = SentimentResult),
        (status = 400, description = "Invalid request", body = ApiError),
    )
)]
pub async fn analyze_sentiment(
    State(state): State<AppState>,
    AppJson(req): AppJson<AnalyzeSentimentRequest>,
) -> ApiResponse<SentimentResult> {
    ApiResponse::success(state.scorer.score(&req.text).await)
}

/// `POST /api/v1/sentiment:batch`
///
/// Results come back in request order.
#[utoipa::path(
    post,
    path = "/api/v1/sentiment:batch",
    tag = "sentiment",
    operation_id = "sentiment.batch",
    request_body = BatchSentimentRequest,
    responses(
        (status = 200, description = "Sentiment scored per text", body = Vec<SentimentResult>),
        (status = 400, description = "Empty or oversized batch", body = ApiError),
    )
)]
pub async fn batch_sentiment(
    State(state): State<AppState>,
    AppJson(req): AppJson<BatchSentimentRequest>,
) -> ApiResponse<Vec<SentimentResult>> {
    if let Err(e) = check_batch_size(req.texts.len(), MAX_SENTIMENT_BATCH, "texts") {
        return e.into();
    }
    let results = state.scorer.score_batch(&req.texts).await;
    let total = results.len();
    ApiResponse::success_with_meta(results, ResponseMeta::total(total))
}

/// `POST /api/v1/sentiment:insights`
#[utoipa::path(
    post,
    path = "/api/v1/sentiment:insights",
    tag = "sentiment",
    operation_id = "sentiment.insights",
    request_body = BatchSentimentRequest,
    responses(
        (status = 200, description = "Aggregate insights over the texts", body = AggregateInsights),
        (status = 400, description = "Empty or oversized batch", body = ApiError),
    )
)]
pub async fn sentiment_insights(
    State(state): State<AppState>,
    AppJson(req): AppJson<BatchSentimentRequest>,
) -> ApiResponse<AggregateInsights> {
    if let Err(e) = check_batch_size(req.texts.len(), MAX_SENTIMENT_BATCH, "texts") {
        return e.into();
    }
    let results = state.scorer.score_batch(&req.texts).await;
    ApiResponse::success(state.scorer.insights(&results))
}
