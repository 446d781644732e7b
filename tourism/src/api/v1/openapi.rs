use axum::Json;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use super::dto;
use super::handlers;
use super::response;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tourism Analytics API",
        version = "1.0.0",
        description = "Demand forecasting, review sentiment and chat intent analytics for tourism businesses.",
    ),
    paths(
        handlers::health::health_check,
        handlers::sentiment::analyze_sentiment,
        handlers::sentiment::batch_sentiment,
        handlers::sentiment::sentiment_insights,
        handlers::intents::classify_intent,
        handlers::intents::extract_entities,
        handlers::intents::intent_taxonomy,
        handlers::observations::create_observation,
        handlers::observations::batch_create_observations,
        handlers::observations::list_observations,
        handlers::forecasting::train_models,
        handlers::forecasting::predict,
        handlers::forecasting::generate_forecast,
        handlers::forecasting::historical_forecasts,
        handlers::forecasting::forecast_accuracy,
        handlers::forecasting::model_performance,
        handlers::forecasting::feature_importance,
        handlers::reviews::create_review,
        handlers::reviews::process_reviews,
        handlers::reviews::process_review,
        handlers::reviews::list_reviews,
        handlers::reviews::review_statistics,
        handlers::analytics::sentiment_dashboard,
        handlers::analytics::chat_dashboard,
        handlers::analytics::lead_dashboard,
        handlers::analytics::overview_dashboard,
        handlers::analytics::record_chat_message,
        handlers::analytics::record_lead,
        handlers::analytics::update_lead,
        handlers::analytics::convert_lead,
    ),
    components(schemas(
        // Response envelope
        response::ErrorCode,
        response::ApiError,
        response::ResponseMeta,
        // Requests
        dto::AnalyzeSentimentRequest,
        dto::BatchSentimentRequest,
        dto::ClassifyIntentRequest,
        dto::ClassifyIntentResponse,
        dto::ExtractEntitiesRequest,
        dto::ExtractEntitiesResponse,
        dto::BatchObservationsRequest,
        dto::TrainRequest,
        dto::PredictRequest,
        dto::ForecastRequest,
        dto::ProcessReviewsRequest,
        dto::ConvertLeadRequest,
        // Domain models
        models::SentimentLabel,
        models::SentimentResult,
        models::SentimentDistribution,
        models::EmotionScore,
        models::KeywordCount,
        models::AggregateInsights,
        models::Intent,
        models::IntentResult,
        models::IntentDetail,
        models::IntentStatistics,
        models::TimeSeriesObservation,
        models::PartialObservation,
        models::BaseConditions,
        models::BulkImportSummary,
        models::ForecastPoint,
        models::ModelMetrics,
        models::TrainingReport,
        models::ForecasterStatus,
        models::ModelPerformance,
        models::FeatureImportance,
        models::AccuracyDetail,
        models::AccuracyReport,
        models::Review,
        models::NewReview,
        models::ReviewStatistics,
        models::ProcessingSummary,
        models::ChatRole,
        models::ChatMessageRecord,
        models::NewChatMessage,
        models::LeadStatus,
        models::LeadRecord,
        models::NewLead,
        models::LeadUpdate,
        models::TrendDirection,
        models::DailySentiment,
        models::SentimentTrend,
        models::SentimentDashboard,
        models::PopularIntent,
        models::ChatAnalytics,
        models::LeadAnalytics,
        models::VisitorSummary,
        models::OverviewComponents,
        models::BusinessOverview,
        // Health
        handlers::health::HealthData,
        handlers::health::DatabaseStatus,
        handlers::health::ForecasterHealth,
        handlers::health::SentimentModelsStatus,
    )),
    tags(
        (name = "health", description = "Health check"),
        (name = "sentiment", description = "Review sentiment scoring and aggregate insights"),
        (name = "intents", description = "Chat intent classification and entity extraction"),
        (name = "observations", description = "Daily demand observations"),
        (name = "forecasting", description = "Demand model training, prediction and accuracy"),
        (name = "reviews", description = "Review storage and sentiment processing"),
        (name = "analytics", description = "Business dashboards, chat and lead tracking"),
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            utoipa::openapi::security::SecurityScheme::Http(utoipa::openapi::security::Http::new(
                utoipa::openapi::security::HttpAuthScheme::Bearer,
            )),
        );
    }
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn redoc_router<S: Clone + Send + Sync + 'static>() -> axum::Router<S> {
    Redoc::with_url("/docs", ApiDoc::openapi()).into()
}
