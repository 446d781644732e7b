use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use super::{AccuracyReport, AggregateInsights, ForecastPoint, ReviewStatistics};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Declining,
    #[default]
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DailySentiment {
    pub date: NaiveDate,
    pub avg_sentiment: f64,
    pub review_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SentimentTrend {
    pub daily_scores: Vec<DailySentiment>,
    pub trend: TrendDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SentimentDashboard {
    pub business_id: String,
    pub period_days: i64,
    pub insights: AggregateInsights,
    pub trend_analysis: SentimentTrend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PopularIntent {
    pub intent: String,
    pub count: usize,
    pub average_confidence: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChatAnalytics {
    pub total_sessions: usize,
    pub total_messages: usize,
    pub user_messages: usize,
    pub assistant_messages: usize,
    pub intent_distribution: BTreeMap<String, usize>,
    pub language_distribution: BTreeMap<String, usize>,
    pub average_confidence: f64,
    pub average_response_time_ms: f64,
    pub popular_intents: Vec<PopularIntent>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LeadAnalytics {
    pub total_leads: usize,
    pub converted_leads: usize,
    pub conversion_rate: f64,
    pub total_conversion_value: f64,
    pub average_lead_score: f64,
    pub status_distribution: BTreeMap<String, usize>,
    pub source_distribution: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VisitorSummary {
    pub total_period: i64,
    pub average_daily: f64,
    pub total_revenue: f64,
    pub data_points: usize,
}

/// Which overview sections were computed successfully.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OverviewComponents {
    pub sentiment_available: bool,
    pub forecast_available: bool,
    pub chat_available: bool,
    pub leads_available: bool,
    pub accuracy_available: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BusinessOverview {
    pub business_id: String,
    pub period_days: i64,
    pub sentiment: Option<SentimentDashboard>,
    pub review_statistics: Option<ReviewStatistics>,
    pub upcoming_forecast: Vec<ForecastPoint>,
    pub forecast_accuracy: Option<AccuracyReport>,
    pub chat: Option<ChatAnalytics>,
    pub leads: Option<LeadAnalytics>,
    pub visitors: VisitorSummary,
    pub components: OverviewComponents,
}
