use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;
use validator::Validate;

use super::{SentimentDistribution, SentimentLabel, SentimentResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Review {
    pub id: String,
    pub business_id: String,
    pub text: String,
    pub rating: Option<i32>,
    pub source: Option<String>,
    pub processed: bool,
    pub sentiment_score: Option<f64>,
    pub sentiment_label: Option<SentimentLabel>,
    pub confidence: Option<f64>,
    #[serde(default)]
    pub emotions: BTreeMap<String, f64>,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Review {
    pub fn new(id: String, new: NewReview) -> Self {
        Self {
            id,
            business_id: new.business_id,
            text: new.text,
            rating: new.rating,
            source: new.source,
            processed: false,
            sentiment_score: None,
            sentiment_label: None,
            confidence: None,
            emotions: BTreeMap::new(),
            keywords: Vec::new(),
            created_at: new.created_at.unwrap_or_else(Utc::now),
        }
    }

    pub fn apply_sentiment(&mut self, result: &SentimentResult) {
        self.processed = true;
        self.sentiment_score = Some(result.sentiment_score);
        self.sentiment_label = Some(result.sentiment_label);
        self.confidence = Some(result.confidence);
        self.emotions = result.emotions.clone();
        self.keywords = result.keywords.clone();
    }

    /// The stored sentiment, if this review has been processed.
    pub fn sentiment(&self) -> Option<SentimentResult> {
        if !self.processed {
            return None;
        }
        Some(SentimentResult {
            sentiment_score: self.sentiment_score?,
            sentiment_label: self.sentiment_label.unwrap_or_default(),
            confidence: self.confidence.unwrap_or(0.0),
            emotions: self.emotions.clone(),
            keywords: self.keywords.clone(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct NewReview {
    #[validate(length(min = 1, max = 128))]
    pub business_id: String,
    #[validate(length(min = 1, max = 20000))]
    pub text: String,
    #[validate(range(min = 1, max = 5))]
    #[serde(default)]
    pub rating: Option<i32>,
    #[serde(default)]
    pub source: Option<String>,
    /// Backdated reviews keep their original timestamp.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReviewStatistics {
    pub total_reviews: usize,
    pub processed_reviews: usize,
    pub average_rating: f64,
    pub sentiment_distribution: SentimentDistribution,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProcessingSummary {
    pub processed: usize,
    pub failed: usize,
}
