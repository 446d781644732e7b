//! v1 Review handlers.

use axum::extract::{Path, State};

use crate::api::extractors::{AppJson, AppQuery};
use crate::api::v1::dto::{PeriodQuery, ProcessReviewsRequest};
use crate::api::v1::response::{ApiError, ApiResponse, ResponseMeta};
use crate::api::AppState;
use crate::models::{NewReview, ProcessingSummary, Review, ReviewStatistics};

/// `POST /api/v1/reviews`
#[utoipa::path(
    post,
    path = "/api/v1/reviews",
    tag = "reviews",
    operation_id = "reviews.create",
    request_body = NewReview,
    responses(
        (status = 201, description = "Review stored unprocessed", body = Review),
        (status = 400, description = "Invalid review", body = ApiError),
    )
)]
pub async fn create_review(
    State(state): State<AppState>,
    AppJson(req): AppJson<NewReview>,
) -> ApiResponse<Review> {
    match state.reviews.create_review(req).await {
        Ok(review) => ApiResponse::created(review),
        Err(e) => e.into(),
    }
}

/// `POST /api/v1/reviews:process`
#[utoipa::path(
    post,
    path = "/api/v1/reviews:process",
    tag = "reviews",
    operation_id = "reviews.processPending",
    request_body = ProcessReviewsRequest,
    responses(
        (status = 200, description = "Processing summary", body = ProcessingSummary),
    )
)]
pub async fn process_reviews(
    State(state): State<AppState>,
    AppJson(req): AppJson<ProcessReviewsRequest>,
) -> ApiResponse<ProcessingSummary> {
    match state
        .reviews
        .process_pending(req.business_id.as_deref(), req.limit)
        .await
    {
        Ok(summary) => ApiResponse::success(summary),
        Err(e) => e.into(),
    }
}

/// `POST /api/v1/reviews/{reviewId}/process`
#[utoipa::path(
    post,
    path = "/api/v1/reviews/{reviewId}/process",
    tag = "reviews",
    operation_id = "reviews.process",
    params(("reviewId" = String, Path, description = "Review ID")),
    responses(
        (status = 200, description = "Review with sentiment", body = Review),
        (status = 404, description = "Review not found", body = ApiError),
    )
)]
pub async fn process_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResponse<Review> {
    match state.reviews.process_review(&id).await {
        Ok(review) => ApiResponse::success(review),
        Err(e) => e.into(),
    }
}

/// `GET /api/v1/businesses/{businessId}/reviews`
#[utoipa::path(
    get,
    path = "/api/v1/businesses/{businessId}/reviews",
    tag = "reviews",
    operation_id = "reviews.list",
    params(
        ("businessId" = String, Path, description = "Business ID"),
        PeriodQuery,
    ),
    responses(
        (status = 200, description = "Reviews from the period, oldest first", body = Vec<Review>),
    )
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(business_id): Path<String>,
    AppQuery(period): AppQuery<PeriodQuery>,
) -> ApiResponse<Vec<Review>> {
    match state.reviews.recent(&business_id, period.days).await {
        Ok(reviews) => {
            let total = reviews.len();
            ApiResponse::success_with_meta(reviews, ResponseMeta::total(total))
        }
        Err(e) => e.into(),
    }
}

/// `GET /api/v1/businesses/{businessId}/reviews/statistics`
#[utoipa::path(
    get,
    path = "/api/v1/businesses/{businessId}/reviews/statistics",
    tag = "reviews",
    operation_id = "reviews.statistics",
    params(
        ("businessId" = String, Path, description = "Business ID"),
        PeriodQuery,
    ),
    responses(
        (status = 200, description = "Counts, mean rating and label distribution", body = ReviewStatistics),
    )
)]
pub async fn review_statistics(
    State(state): State<AppState>,
    Path(business_id): Path<String>,
    AppQuery(period): AppQuery<PeriodQuery>,
) -> ApiResponse<ReviewStatistics> {
    match state
        .reviews
        .statistics(&business_id, Some(period.days))
        .await
    {
        Ok(stats) => ApiResponse::success(stats),
        Err(e) => e.into(),
    }
}
