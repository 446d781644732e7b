//! v1 Observation handlers.

use axum::extract::{Path, State};
use chrono::{Duration, Utc};

use crate::api::extractors::{AppJson, AppQuery};
use crate::api::v1::dto::{
    check_batch_size, BatchObservationsRequest, DateRangeQuery, MAX_OBSERVATION_BATCH,
};
use crate::api::v1::response::{ApiError, ApiResponse, ResponseMeta};
use crate::api::AppState;
use crate::models::{BulkImportSummary, TimeSeriesObservation};

/// Window served when a range query gives no start date.
const DEFAULT_RANGE_DAYS: i64 = 90;

/// `POST /api/v1/observations`
#[utoipa::path(
    post,
    path = "/api/v1/observations",
    tag = "observations",
    operation_id = "observations.create",
    request_body = TimeSeriesObservation,
    responses(
        (status = 201, description = "Observation stored", body = TimeSeriesObservation),
        (status = 400, description = "Invalid or duplicate observation", body = ApiError),
    )
)]
pub async fn create_observation(
    State(state): State<AppState>,
    AppJson(req): AppJson<TimeSeriesObservation>,
) -> ApiResponse<TimeSeriesObservation> {
    match state.forecasting.add_observation(req).await {
        Ok(observation) => ApiResponse::created(observation),
        Err(e) => e.into(),
    }
}

/// `POST /api/v1/observations:batch`
///
/// Rows are imported independently; rejected rows are reported, not fatal.
#[utoipa::path(
    post,
    path = "/api/v1/observations:batch",
    tag = "observations",
    operation_id = "observations.batchCreate",
    request_body = BatchObservationsRequest,
    responses(
        (status = 200, description = "Import summary", body = BulkImportSummary),
        (status = 400, description = "Empty or oversized batch", body = ApiError),
    )
)]
pub async fn batch_create_observations(
    State(state): State<AppState>,
    AppJson(req): AppJson<BatchObservationsRequest>,
) -> ApiResponse<BulkImportSummary> {
    if let Err(e) = check_batch_size(req.observations.len(), MAX_OBSERVATION_BATCH, "observations")
    {
        return e.into();
    }
    match state.forecasting.bulk_add_observations(req.observations).await {
        Ok(summary) => ApiResponse::success(summary),
        Err(e) => e.into(),
    }
}

/// `GET /api/v1/businesses/{businessId}/observations`
#[utoipa::path(
    get,
    path = "/api/v1/businesses/{businessId}/observations",
    tag = "observations",
    operation_id = "observations.list",
    params(
        ("businessId" = String, Path, description = "Business ID"),
        DateRangeQuery,
    ),
    responses(
        (status = 200, description = "Observations in date order", body = Vec<TimeSeriesObservation>),
        (status = 400, description = "Start after end", body = ApiError),
    )
)]
pub async fn list_observations(
    State(state): State<AppState>,
    Path(business_id): Path<String>,
    AppQuery(range): AppQuery<DateRangeQuery>,
) -> ApiResponse<Vec<TimeSeriesObservation>> {
    let end = range.end.unwrap_or_else(|| Utc::now().date_naive());
    let start = range
        .start
        .unwrap_or(end - Duration::days(DEFAULT_RANGE_DAYS));

    match state.forecasting.observations(&business_id, start, end).await {
        Ok(observations) => {
            let total = observations.len();
            ApiResponse::success_with_meta(observations, ResponseMeta::total(total))
        }
        Err(e) => e.into(),
    }
}
