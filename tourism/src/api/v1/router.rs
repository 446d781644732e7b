use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use crate::api::state::AppState;

use super::handlers;
use super::middleware::v1_auth_middleware;

pub fn v1_router(state: AppState) -> Router<AppState> {
    let businesses = Router::new()
        .route(
            "/{businessId}/observations",
            get(handlers::observations::list_observations),
        )
        .route(
            "/{businessId}/forecast",
            post(handlers::forecasting::generate_forecast),
        )
        .route(
            "/{businessId}/forecast/accuracy",
            get(handlers::forecasting::forecast_accuracy),
        )
        .route(
            "/{businessId}/forecasts",
            get(handlers::forecasting::historical_forecasts),
        )
        .route("/{businessId}/reviews", get(handlers::reviews::list_reviews))
        .route(
            "/{businessId}/reviews/statistics",
            get(handlers::reviews::review_statistics),
        )
        .route(
            "/{businessId}/dashboards/sentiment",
            get(handlers::analytics::sentiment_dashboard),
        )
        .route(
            "/{businessId}/dashboards/chat",
            get(handlers::analytics::chat_dashboard),
        )
        .route(
            "/{businessId}/dashboards/leads",
            get(handlers::analytics::lead_dashboard),
        )
        .route(
            "/{businessId}/dashboards/overview",
            get(handlers::analytics::overview_dashboard),
        );

    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/openapi.json", get(super::openapi::openapi_json))
        .merge(super::openapi::redoc_router());

    let protected_routes = Router::new()
        .route(
            "/sentiment:analyze",
            post(handlers::sentiment::analyze_sentiment),
        )
        .route("/sentiment:batch", post(handlers::sentiment::batch_sentiment))
        .route(
            "/sentiment:insights",
            post(handlers::sentiment::sentiment_insights),
        )
        .route("/intents:classify", post(handlers::intents::classify_intent))
        .route("/intents:entities", post(handlers::intents::extract_entities))
        .route("/intents/taxonomy", get(handlers::intents::intent_taxonomy))
        .route(
            "/observations",
            post(handlers::observations::create_observation),
        )
        .route(
            "/observations:batch",
            post(handlers::observations::batch_create_observations),
        )
        .route("/forecasting:train", post(handlers::forecasting::train_models))
        .route("/forecasting:predict", post(handlers::forecasting::predict))
        .route(
            "/forecasting/performance",
            get(handlers::forecasting::model_performance),
        )
        .route(
            "/forecasting/importance",
            get(handlers::forecasting::feature_importance),
        )
        .route("/reviews", post(handlers::reviews::create_review))
        .route("/reviews:process", post(handlers::reviews::process_reviews))
        .route(
            "/reviews/{reviewId}/process",
            post(handlers::reviews::process_review),
        )
        .route(
            "/chat/messages",
            post(handlers::analytics::record_chat_message),
        )
        .route("/leads", post(handlers::analytics::record_lead))
        .route("/leads/{leadId}", patch(handlers::analytics::update_lead))
        .route(
            "/leads/{leadId}/convert",
            post(handlers::analytics::convert_lead),
        )
        .nest("/businesses", businesses)
        .route_layer(middleware::from_fn_with_state(state, v1_auth_middleware));

    Router::new().merge(public_routes).merge(protected_routes)
}
