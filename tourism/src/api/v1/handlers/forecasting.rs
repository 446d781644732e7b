//! v1 Forecasting handlers.

use axum::extract::{Path, State};

use crate::api::extractors::{AppJson, AppQuery};
use crate::api::v1::dto::{
    check_batch_size, AccuracyQuery, DateRangeQuery, ForecastRequest, ImportanceQuery,
    PredictRequest, TrainRequest, MAX_PREDICT_ROWS,
};
use crate::api::v1::response::{ApiError, ApiResponse, ResponseMeta};
use crate::api::AppState;
use crate::forecasting::ModelKind;
use crate::models::{
    AccuracyReport, FeatureImportance, ForecastPoint, ModelPerformance, TrainingReport,
};

/// `POST /api/v1/forecasting:train`
///
/// Fits every regressor on the stored observation window and installs the
/// new bundle. A failed persist is reported in the body, not as an error.
#[utoipa::path(
    post,
    path = "/api/v1/forecasting:train",
    tag = "forecasting",
    operation_id = "forecasting.train",
    request_body = TrainRequest,
    responses(
        (status = 200, description = "Models trained", body = TrainingReport),
        (status = 400, description = "No usable observations", body = ApiError),
    )
)]
pub async fn train_models(
    State(state): State<AppState>,
    AppJson(req): AppJson<TrainRequest>,
) -> ApiResponse<TrainingReport> {
    match state
        .forecasting
        .train_models(req.business_id.as_deref())
        .await
    {
        Ok(report) => ApiResponse::success(report),
        Err(e) => e.into(),
    }
}

/// `POST /api/v1/forecasting:predict`
#[utoipa::path(
    post,
    path = "/api/v1/forecasting:predict",
    tag = "forecasting",
    operation_id = "forecasting.predict",
    request_body = PredictRequest,
    responses(
        (status = 200, description = "One forecast point per input row", body = Vec<ForecastPoint>),
        (status = 400, description = "Invalid rows or unknown model", body = ApiError),
        (status = 409, description = "Forecaster not trained", body = ApiError),
    )
)]
pub async fn predict(
    State(state): State<AppState>,
    AppJson(req): AppJson<PredictRequest>,
) -> ApiResponse<Vec<ForecastPoint>> {
    if let Err(e) = check_batch_size(req.observations.len(), MAX_PREDICT_ROWS, "observations") {
        return e.into();
    }
    match state.forecasting.predict(req.observations, req.model).await {
        Ok(points) => {
            let total = points.len();
            ApiResponse::success_with_meta(points, ResponseMeta::total(total))
        }
        Err(e) => e.into(),
    }
}

/// `POST /api/v1/businesses/{businessId}/forecast`
///
/// Forecasts from tomorrow onward and stores the points for later accuracy checks.
#[utoipa::path(
    post,
    path = "/api/v1/businesses/{businessId}/forecast",
    tag = "forecasting",
    operation_id = "forecasting.generate",
    params(("businessId" = String, Path, description = "Business ID")),
    request_body = ForecastRequest,
    responses(
        (status = 201, description = "Forecast generated and stored", body = Vec<ForecastPoint>),
        (status = 400, description = "Invalid horizon", body = ApiError),
        (status = 409, description = "Forecaster not trained", body = ApiError),
    )
)]
pub async fn generate_forecast(
    State(state): State<AppState>,
    Path(business_id): Path<String>,
    AppJson(req): AppJson<ForecastRequest>,
) -> ApiResponse<Vec<ForecastPoint>> {
    match state
        .forecasting
        .generate_forecast(&business_id, req.days, req.base_conditions)
        .await
    {
        Ok(points) => ApiResponse::created(points),
        Err(e) => e.into(),
    }
}

/// `GET /api/v1/businesses/{businessId}/forecasts`
#[utoipa::path(
    get,
    path = "/api/v1/businesses/{businessId}/forecasts",
    tag = "forecasting",
    operation_id = "forecasting.history",
    params(
        ("businessId" = String, Path, description = "Business ID"),
        DateRangeQuery,
    ),
    responses(
        (status = 200, description = "Stored forecasts in date order", body = Vec<ForecastPoint>),
    )
)]
pub async fn historical_forecasts(
    State(state): State<AppState>,
    Path(business_id): Path<String>,
    AppQuery(range): AppQuery<DateRangeQuery>,
) -> ApiResponse<Vec<ForecastPoint>> {
    match state
        .forecasting
        .historical_forecasts(&business_id, range.start, range.end)
        .await
    {
        Ok(points) => {
            let total = points.len();
            ApiResponse::success_with_meta(points, ResponseMeta::total(total))
        }
        Err(e) => e.into(),
    }
}

/// `GET /api/v1/businesses/{businessId}/forecast/accuracy`
#[utoipa::path(
    get,
    path = "/api/v1/businesses/{businessId}/forecast/accuracy",
    tag = "forecasting",
    operation_id = "forecasting.accuracy",
    params(
        ("businessId" = String, Path, description = "Business ID"),
        AccuracyQuery,
    ),
    responses(
        (status = 200, description = "Forecast vs actual comparison", body = AccuracyReport),
        (status = 400, description = "Invalid window", body = ApiError),
    )
)]
pub async fn forecast_accuracy(
    State(state): State<AppState>,
    Path(business_id): Path<String>,
    AppQuery(query): AppQuery<AccuracyQuery>,
) -> ApiResponse<AccuracyReport> {
    match state
        .forecasting
        .forecast_accuracy(&business_id, query.days_back)
        .await
    {
        Ok(report) => ApiResponse::success(report),
        Err(e) => e.into(),
    }
}

/// `GET /api/v1/forecasting/performance`
#[utoipa::path(
    get,
    path = "/api/v1/forecasting/performance",
    tag = "forecasting",
    operation_id = "forecasting.performance",
    responses(
        (status = 200, description = "Installed bundle metrics", body = ModelPerformance),
    )
)]
pub async fn model_performance(State(state): State<AppState>) -> ApiResponse<ModelPerformance> {
    ApiResponse::success(state.forecaster.performance())
}

/// `GET /api/v1/forecasting/importance`
#[utoipa::path(
    get,
    path = "/api/v1/forecasting/importance",
    tag = "forecasting",
    operation_id = "forecasting.importance",
    params(ImportanceQuery),
    responses(
        (status = 200, description = "Top features by importance", body = Vec<FeatureImportance>),
        (status = 409, description = "Forecaster not trained", body = ApiError),
        (status = 422, description = "Model has no importances", body = ApiError),
    )
)]
pub async fn feature_importance(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ImportanceQuery>,
) -> ApiResponse<Vec<FeatureImportance>> {
    let model = query
        .model
        .unwrap_or_else(|| ModelKind::RandomForest.as_str().to_string());

    match state.forecaster.feature_importance(&model) {
        Ok(ranked) => ApiResponse::success(ranked),
        Err(e) => e.into(),
    }
}
