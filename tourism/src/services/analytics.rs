use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration as TtlDuration;

use chrono::{Duration, NaiveDate, Utc};
use nanoid::nanoid;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};
use validator::Validate;

use super::reviews::review_statistics;
use super::{check_period, round_to, ForecastingService};
use crate::cache::{self, Cache};
use crate::db::StorageBackend;
use crate::error::{Result, TourismError};
use crate::intent::IntentClassifier;
use crate::models::{
    BaseConditions, BusinessOverview, ChatAnalytics, ChatMessageRecord, ChatRole, DailySentiment,
    LeadAnalytics, LeadRecord, LeadUpdate, NewChatMessage, NewLead, OverviewComponents, PopularIntent,
    SentimentDashboard, SentimentResult, SentimentTrend, TrendDirection, VisitorSummary,
};
use crate::sentiment::{SentimentScorer, AGGREGATE_THRESHOLD};

pub const DASHBOARD_CACHE_NAMESPACE: &str = "dashboard";
/// Longest reporting period accepted by the dashboards.
pub const MAX_PERIOD_DAYS: i64 = 365;
/// Number of most recent daily averages compared against the earlier ones.
const TREND_RECENT_DAYS: usize = 7;
const POPULAR_INTENTS: usize = 10;
const OVERVIEW_FORECAST_DAYS: u32 = 7;

/// Per-business dashboards over reviews, chat traffic, leads and demand.
pub struct AnalyticsService {
    store: Arc<dyn StorageBackend>,
    forecasting: ForecastingService,
    scorer: SentimentScorer,
    intents: Arc<IntentClassifier>,
    cache: Arc<dyn Cache>,
    dashboard_ttl: TtlDuration,
}

impl AnalyticsService {
    pub fn new(
        store: Arc<dyn StorageBackend>,
        forecasting: ForecastingService,
        scorer: SentimentScorer,
        intents: Arc<IntentClassifier>,
        cache: Arc<dyn Cache>,
        dashboard_ttl: TtlDuration,
    ) -> Self {
        Self {
            store,
            forecasting,
            scorer,
            intents,
            cache,
            dashboard_ttl,
        }
    }

    /// Serves `kind` from the dashboard cache, computing and storing it on a miss.
    async fn cached<T, F, Fut>(&self, business_id: &str, kind: &str, days: i64, compute: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        validate_period(business_id, days)?;
        let key = dashboard_key(business_id, kind, days);
        if let Some(hit) = cache::get_json::<T>(self.cache.as_ref(), &key).await {
            return Ok(hit);
        }

        let value = compute().await?;
        cache::set_json(self.cache.as_ref(), &key, &value, self.dashboard_ttl).await;
        Ok(value)
    }

    pub async fn sentiment_dashboard(&self, business_id: &str, days: i64) -> Result<SentimentDashboard> {
        self.cached(business_id, "sentiment", days, || {
            self.compute_sentiment_dashboard(business_id, days)
        })
        .await
    }

    async fn compute_sentiment_dashboard(&self, business_id: &str, days: i64) -> Result<SentimentDashboard> {
        let reviews = self
            .store
            .list_reviews(business_id, Utc::now() - Duration::days(days))
            .await?;

        let pending: Vec<&str> = reviews
            .iter()
            .filter(|r| r.sentiment().is_none())
            .map(|r| r.text.as_str())
            .collect();
        let mut fresh = self.scorer.score_batch(&pending).await.into_iter();

        let scored: Vec<(NaiveDate, SentimentResult)> = reviews
            .iter()
            .filter_map(|review| {
                let result = review.sentiment().or_else(|| fresh.next())?;
                Some((review.created_at.date_naive(), result))
            })
            .collect();

        let results: Vec<_> = scored.iter().map(|(_, r)| r.clone()).collect();
        let daily: Vec<(NaiveDate, f64)> = scored
            .iter()
            .map(|(date, r)| (*date, r.sentiment_score))
            .collect();

        Ok(SentimentDashboard {
            business_id: business_id.to_string(),
            period_days: days,
            insights: self.scorer.insights(&results),
            trend_analysis: sentiment_trend(&daily),
        })
    }

    pub async fn chat_analytics(&self, business_id: &str, days: i64) -> Result<ChatAnalytics> {
        self.cached(business_id, "chat", days, || async move {
            let messages = self
                .store
                .list_chat_messages(business_id, Utc::now() - Duration::days(days))
                .await?;
            Ok(chat_analytics(&messages))
        })
        .await
    }

    pub async fn lead_analytics(&self, business_id: &str, days: i64) -> Result<LeadAnalytics> {
        self.cached(business_id, "leads", days, || async move {
            let since = Utc::now() - Duration::days(days);
            let leads = self.store.list_leads(business_id, since).await?;
            Ok(lead_analytics(&leads, since))
        })
        .await
    }

    /// Everything known about a business for the period. Sections that fail
    /// are logged and left empty rather than failing the overview.
    pub async fn overview(&self, business_id: &str, days: i64) -> Result<BusinessOverview> {
        self.cached(business_id, "overview", days, || {
            self.compute_overview(business_id, days)
        })
        .await
    }

    async fn compute_overview(&self, business_id: &str, days: i64) -> Result<BusinessOverview> {
        let mut components = OverviewComponents::default();

        let sentiment = degrade("sentiment", self.sentiment_dashboard(business_id, days).await);
        components.sentiment_available = sentiment.is_some();

        let reviews = self
            .store
            .list_reviews(business_id, Utc::now() - Duration::days(days))
            .await;
        let review_statistics = degrade("review statistics", reviews.map(|r| review_statistics(&r)));

        let upcoming = self.forecasting.forecaster().forecast_future(
            business_id,
            OVERVIEW_FORECAST_DAYS,
            &BaseConditions::default(),
        );
        let upcoming_forecast = degrade("forecast", upcoming).unwrap_or_default();
        components.forecast_available = !upcoming_forecast.is_empty();

        let forecast_accuracy = degrade(
            "forecast accuracy",
            self.forecasting.forecast_accuracy(business_id, days).await,
        );
        components.accuracy_available = forecast_accuracy
            .as_ref()
            .is_some_and(|report| report.data_points > 0);

        let chat = degrade("chat", self.chat_analytics(business_id, days).await);
        components.chat_available = chat.is_some();

        let leads = degrade("leads", self.lead_analytics(business_id, days).await);
        components.leads_available = leads.is_some();

        let today = Utc::now().date_naive();
        let visitors = degrade(
            "visitors",
            self.store
                .query_observations(business_id, today - Duration::days(days), today)
                .await,
        )
        .map(|rows| {
            let total: i64 = rows.iter().map(|o| o.visitor_count).sum();
            VisitorSummary {
                total_period: total,
                average_daily: round_to(total as f64 / days as f64, 1),
                total_revenue: rows.iter().filter_map(|o| o.revenue).sum(),
                data_points: rows.len(),
            }
        })
        .unwrap_or_default();

        Ok(BusinessOverview {
            business_id: business_id.to_string(),
            period_days: days,
            sentiment,
            review_statistics,
            upcoming_forecast,
            forecast_accuracy,
            chat,
            leads,
            visitors,
            components,
        })
    }

    /// Stores a chat message, classifying the intent of user messages first.
    pub async fn record_chat_message(&self, request: NewChatMessage) -> Result<ChatMessageRecord> {
        request.validate()?;
        let mut message = ChatMessageRecord::new(nanoid!(), request);

        if message.role == ChatRole::User {
            let result = self.intents.classify(&message.text).await;
            message.intent = Some(result.intent);
            message.confidence = Some(result.confidence);
        }

        self.store.append_chat_message(&message).await?;
        debug!(
            business_id = %message.business_id,
            session_id = %message.session_id,
            intent = ?message.intent,
            "Chat message recorded"
        );
        Ok(message)
    }

    pub async fn record_lead(&self, request: NewLead) -> Result<LeadRecord> {
        request.validate()?;
        let lead = LeadRecord::new(nanoid!(), request);
        self.store.create_lead(&lead).await?;
        Ok(lead)
    }

    async fn lead(&self, id: &str) -> Result<LeadRecord> {
        self.store
            .get_lead(id)
            .await?
            .ok_or_else(|| TourismError::NotFound(format!("Lead {id}")))
    }

    pub async fn update_lead(&self, id: &str, update: LeadUpdate) -> Result<LeadRecord> {
        update.validate()?;
        let mut lead = self.lead(id).await?;
        lead.apply(update, Utc::now());
        self.store.update_lead(&lead).await?;
        debug!(lead_id = %lead.id, status = %lead.status, "Lead updated");
        Ok(lead)
    }

    /// Marks a lead converted. The conversion counts toward the funnel of the
    /// period it happens in, whenever the lead was created.
    pub async fn convert_lead(&self, id: &str, conversion_value: Option<f64>) -> Result<LeadRecord> {
        if conversion_value.is_some_and(|v| !v.is_finite() || v < 0.0) {
            return Err(TourismError::Validation(
                "conversion_value must be a non-negative number".to_string(),
            ));
        }
        let mut lead = self.lead(id).await?;
        lead.convert(conversion_value, Utc::now());
        self.store.update_lead(&lead).await?;
        info!(lead_id = %lead.id, business_id = %lead.business_id, "Lead converted");
        Ok(lead)
    }
}

fn dashboard_key(business_id: &str, kind: &str, days: i64) -> String {
    format!("{DASHBOARD_CACHE_NAMESPACE}:{business_id}:{kind}:{days}")
}

fn validate_period(business_id: &str, days: i64) -> Result<()> {
    if business_id.trim().is_empty() {
        return Err(TourismError::Validation("business_id is required".to_string()));
    }
    check_period("days", days)
}

fn degrade<T>(section: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(section, error = %e, "Overview section unavailable");
            None
        }
    }
}

/// Daily mean scores and their direction.
///
/// The mean of the last (up to) seven daily averages is compared with the mean
/// of the earlier days. With seven days or fewer there are no earlier days and
/// the baseline is 0. Fewer than two days is always stable.
pub fn sentiment_trend(scores: &[(NaiveDate, f64)]) -> SentimentTrend {
    let mut by_day: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for (date, score) in scores {
        let entry = by_day.entry(*date).or_insert((0.0, 0));
        entry.0 += score;
        entry.1 += 1;
    }

    let daily_scores: Vec<DailySentiment> = by_day
        .into_iter()
        .map(|(date, (sum, count))| DailySentiment {
            date,
            avg_sentiment: round_to(sum / count as f64, 3),
            review_count: count,
        })
        .collect();

    let n = daily_scores.len();
    if n < 2 {
        return SentimentTrend {
            daily_scores,
            trend: TrendDirection::Stable,
        };
    }

    let split = n - TREND_RECENT_DAYS.min(n);
    let total = |days: &[DailySentiment]| days.iter().map(|d| d.avg_sentiment).sum::<f64>();
    let recent = total(&daily_scores[split..]) / (n - split) as f64;
    let earlier = total(&daily_scores[..split]) / split.max(1) as f64;
    let change = recent - earlier;

    let trend = if change > AGGREGATE_THRESHOLD {
        TrendDirection::Improving
    } else if change < -AGGREGATE_THRESHOLD {
        TrendDirection::Declining
    } else {
        TrendDirection::Stable
    };

    SentimentTrend { daily_scores, trend }
}

pub fn chat_analytics(messages: &[ChatMessageRecord]) -> ChatAnalytics {
    let sessions: BTreeSet<&str> = messages.iter().map(|m| m.session_id.as_str()).collect();
    let user: Vec<&ChatMessageRecord> = messages.iter().filter(|m| m.role == ChatRole::User).collect();
    let assistant: Vec<&ChatMessageRecord> = messages
        .iter()
        .filter(|m| m.role == ChatRole::Assistant)
        .collect();

    let mut intent_distribution = BTreeMap::new();
    let mut language_distribution = BTreeMap::new();
    // intent -> (count, confidence sum, confidence count)
    let mut per_intent: HashMap<String, (usize, f64, usize)> = HashMap::new();
    let mut confidences = Vec::new();

    for message in &user {
        if let Some(intent) = message.intent {
            *intent_distribution.entry(intent.to_string()).or_insert(0) += 1;
            let entry = per_intent.entry(intent.to_string()).or_insert((0, 0.0, 0));
            entry.0 += 1;
            if let Some(confidence) = message.confidence.filter(|c| *c > 0.0) {
                entry.1 += confidence;
                entry.2 += 1;
            }
        }
        if let Some(confidence) = message.confidence.filter(|c| *c > 0.0) {
            confidences.push(confidence);
        }
        if let Some(language) = message.language.as_deref().filter(|l| !l.is_empty()) {
            *language_distribution.entry(language.to_string()).or_insert(0) += 1;
        }
    }

    let response_times: Vec<f64> = assistant
        .iter()
        .filter_map(|m| m.response_time_ms.filter(|t| *t > 0))
        .map(|t| t as f64)
        .collect();

    let classified: usize = per_intent.values().map(|(count, _, _)| count).sum();
    let mut popular_intents: Vec<PopularIntent> = per_intent
        .into_iter()
        .map(|(intent, (count, sum, n))| PopularIntent {
            intent,
            count,
            average_confidence: if n == 0 { 0.0 } else { round_to(sum / n as f64, 3) },
            percentage: round_to(count as f64 / classified as f64 * 100.0, 1),
        })
        .collect();
    popular_intents.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.intent.cmp(&b.intent)));
    popular_intents.truncate(POPULAR_INTENTS);

    ChatAnalytics {
        total_sessions: sessions.len(),
        total_messages: messages.len(),
        user_messages: user.len(),
        assistant_messages: assistant.len(),
        intent_distribution,
        language_distribution,
        average_confidence: mean_or_zero(&confidences, 3),
        average_response_time_ms: mean_or_zero(&response_times, 1),
        popular_intents,
    }
}

/// Funnel metrics for leads created since `since`. Conversions count when the
/// conversion itself falls in the period, even for older leads.
pub fn lead_analytics(leads: &[LeadRecord], since: chrono::DateTime<Utc>) -> LeadAnalytics {
    let created: Vec<&LeadRecord> = leads.iter().filter(|l| l.created_at >= since).collect();
    let converted: Vec<&LeadRecord> = leads
        .iter()
        .filter(|l| l.conversion_time().is_some_and(|t| t >= since))
        .collect();

    let mut status_distribution = BTreeMap::new();
    let mut source_distribution = BTreeMap::new();
    for lead in &created {
        *status_distribution.entry(lead.status.to_string()).or_insert(0) += 1;
        let source = lead.source.clone().unwrap_or_else(|| "unknown".to_string());
        *source_distribution.entry(source).or_insert(0) += 1;
    }

    let scores: Vec<f64> = created.iter().filter_map(|l| l.score).collect();
    let conversion_rate = if created.is_empty() {
        0.0
    } else {
        round_to(converted.len() as f64 / created.len() as f64 * 100.0, 2)
    };

    LeadAnalytics {
        total_leads: created.len(),
        converted_leads: converted.len(),
        conversion_rate,
        total_conversion_value: converted.iter().filter_map(|l| l.conversion_value).sum(),
        average_lead_score: mean_or_zero(&scores, 1),
        status_distribution,
        source_distribution,
    }
}

fn mean_or_zero(values: &[f64], decimals: i32) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        round_to(values.iter().sum::<f64>() / values.len() as f64, decimals)
    }
}
