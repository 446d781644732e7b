//! v1 Dashboard and engagement handlers.

use axum::extract::{Path, State};

use crate::api::extractors::{AppJson, AppQuery};
use crate::api::v1::dto::{ConvertLeadRequest, PeriodQuery};
use crate::api::v1::response::{ApiError, ApiResponse};
use crate::api::AppState;
use crate::models::{
    BusinessOverview, ChatAnalytics, ChatMessageRecord, LeadAnalytics, LeadRecord, LeadUpdate,
    NewChatMessage, NewLead, SentimentDashboard,
};

/// `GET /api/v1/businesses/{businessId}/dashboards/sentiment`
#[utoipa::path(
    get,
    path = "/api/v1/businesses/{businessId}/dashboards/sentiment",
    tag = "analytics",
    operation_id = "dashboards.sentiment",
    params(
        ("businessId" = String, Path, description = "Business ID"),
        PeriodQuery,
    ),
    responses(
        (status = 200, description = "Review sentiment insights and trend", body = SentimentDashboard),
        (status = 400, description = "Invalid period", body = ApiError),
    )
)]
pub async fn sentiment_dashboard(
    State(state): State<AppState>,
    Path(business_id): Path<String>,
    AppQuery(period): AppQuery<PeriodQuery>,
) -> ApiResponse<SentimentDashboard> {
    match state
        .analytics
        .sentiment_dashboard(&business_id, period.days)
        .await
    {
        Ok(dashboard) => ApiResponse::success(dashboard),
        Err(e) => e.into(),
    }
}

/// `GET /api/v1/businesses/{businessId}/dashboards/chat`
#[utoipa::path(
    get,
    path = "/api/v1/businesses/{businessId}/dashboards/chat",
    tag = "analytics",
    operation_id = "dashboards.chat",
    params(
        ("businessId" = String, Path, description = "Business ID"),
        PeriodQuery,
    ),
    responses(
        (status = 200, description = "Chat traffic and intent analytics", body = ChatAnalytics),
        (status = 400, description = "Invalid period", body = ApiError),
    )
)]
pub async fn chat_dashboard(
    State(state): State<AppState>,
    Path(business_id): Path<String>,
    AppQuery(period): AppQuery<PeriodQuery>,
) -> ApiResponse<ChatAnalytics> {
    match state
        .analytics
        .chat_analytics(&business_id, period.days)
        .await
    {
        Ok(analytics) => ApiResponse::success(analytics),
        Err(e) => e.into(),
    }
}

/// `GET /api/v1/businesses/{businessId}/dashboards/leads`
#[utoipa::path(
    get,
    path = "/api/v1/businesses/{businessId}/dashboards/leads",
    tag = "analytics",
    operation_id = "dashboards.leads",
    params(
        ("businessId" = String, Path, description = "Business ID"),
        PeriodQuery,
    ),
    responses(
        (status = 200, description = "Lead funnel", body = LeadAnalytics),
        (status = 400, description = "Invalid period", body = ApiError),
    )
)]
pub async fn lead_dashboard(
    State(state): State<AppState>,
    Path(business_id): Path<String>,
    AppQuery(period): AppQuery<PeriodQuery>,
) -> ApiResponse<LeadAnalytics> {
    match state
        .analytics
        .lead_analytics(&business_id, period.days)
        .await
    {
        Ok(analytics) => ApiResponse::success(analytics),
        Err(e) => e.into(),
    }
}

/// `GET /api/v1/businesses/{businessId}/dashboards/overview`
///
/// Sections that fail are left empty and flagged in `components`.
#[utoipa::path(
    get,
    path = "/api/v1/businesses/{businessId}/dashboards/overview",
    tag = "analytics",
    operation_id = "dashboards.overview",
    params(
        ("businessId" = String, Path, description = "Business ID"),
        PeriodQuery,
    ),
    responses(
        (status = 200, description = "Combined business overview", body = BusinessOverview),
        (status = 400, description = "Invalid period", body = ApiError),
    )
)]
pub async fn overview_dashboard(
    State(state): State<AppState>,
    Path(business_id): Path<String>,
    AppQuery(period): AppQuery<PeriodQuery>,
) -> ApiResponse<BusinessOverview> {
    match state.analytics.overview(&business_id, period.days).await {
        Ok(overview) => ApiResponse::success(overview),
        Err(e) => e.into(),
    }
}

/// `POST /api/v1/chat/messages`
///
/// User messages are classified before they are stored.
#[utoipa::path(
    post,
    path = "/api/v1/chat/messages",
    tag = "analytics",
    operation_id = "chat.recordMessage",
    request_body = NewChatMessage,
    responses(
        (status = 201, description = "Message recorded", body = ChatMessageRecord),
        (status = 400, description = "Invalid message", body = ApiError),
    )
)]
pub async fn record_chat_message(
    State(state): State<AppState>,
    AppJson(req): AppJson<NewChatMessage>,
) -> ApiResponse<ChatMessageRecord> {
    match state.analytics.record_chat_message(req).await {
        Ok(record) => ApiResponse::created(record),
        Err(e) => e.into(),
    }
}

/// `POST /api/v1/leads`
#[utoipa::path(
    post,
    path = "/api/v1/leads",
    tag = "analytics",
    operation_id = "leads.create",
    request_body = NewLead,
    responses(
        (status = 201, description = "Lead recorded", body = LeadRecord),
        (status = 400, description = "Invalid lead", body = ApiError),
    )
)]
pub async fn record_lead(
    State(state): State<AppState>,
    AppJson(req): AppJson<NewLead>,
) -> ApiResponse<LeadRecord> {
    match state.analytics.record_lead(req).await {
        Ok(lead) => ApiResponse::created(lead),
        Err(e) => e.into(),
    }
}

/// `PATCH /api/v1/leads/{leadId}`
#[utoipa::path(
    patch,
    path = "/api/v1/leads/{leadId}",
    tag = "analytics",
    operation_id = "leads.update",
    params(("leadId" = String, Path, description = "Lead ID")),
    request_body = LeadUpdate,
    responses(
        (status = 200, description = "Updated lead", body = LeadRecord),
        (status = 400, description = "Invalid update", body = ApiError),
        (status = 404, description = "Lead not found", body = ApiError),
    )
)]
pub async fn update_lead(
    State(state): State<AppState>,
    Path(lead_id): Path<String>,
    AppJson(req): AppJson<LeadUpdate>,
) -> ApiResponse<LeadRecord> {
    match state.analytics.update_lead(&lead_id, req).await {
        Ok(lead) => ApiResponse::success(lead),
        Err(e) => e.into(),
    }
}

/// `POST /api/v1/leads/{leadId}/convert`
#[utoipa::path(
    post,
    path = "/api/v1/leads/{leadId}/convert",
    tag = "analytics",
    operation_id = "leads.convert",
    params(("leadId" = String, Path, description = "Lead ID")),
    request_body = ConvertLeadRequest,
    responses(
        (status = 200, description = "Converted lead", body = LeadRecord),
        (status = 404, description = "Lead not found", body = ApiError),
    )
)]
pub async fn convert_lead(
    State(state): State<AppState>,
    Path(lead_id): Path<String>,
    AppJson(req): AppJson<ConvertLeadRequest>,
) -> ApiResponse<LeadRecord> {
    match state.analytics.convert_lead(&lead_id, req.conversion_value).await {
        Ok(lead) => ApiResponse::success(lead),
        Err(e) => e.into(),
    }
}
