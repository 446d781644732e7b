use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    Positive,
    #[default]
    Neutral,
    Negative,
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Positive => write!(f, "positive"),
            Self::Neutral => write!(f, "neutral"),
            Self::Negative => write!(f, "negative"),
        }
    }
}

impl std::str::FromStr for SentimentLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "positive" => Ok(Self::Positive),
            "neutral" => Ok(Self::Neutral),
            "negative" => Ok(Self::Negative),
            _ => Err(format!("Unknown sentiment label: {s}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SentimentResult {
    pub sentiment_score: f64,
    pub sentiment_label: SentimentLabel,
    pub confidence: f64,
    #[serde(default)]
    pub emotions: BTreeMap<String, f64>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl SentimentResult {
    /// Zero-confidence neutral placeholder.
    pub fn neutral() -> Self {
        Self {
            sentiment_score: 0.0,
            sentiment_label: SentimentLabel::Neutral,
            confidence: 0.0,
            emotions: BTreeMap::new(),
            keywords: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SentimentDistribution {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

impl SentimentDistribution {
    pub fn record(&mut self, label: SentimentLabel) {
        match label {
            SentimentLabel::Positive => self.positive += 1,
            SentimentLabel::Neutral => self.neutral += 1,
            SentimentLabel::Negative => self.negative += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EmotionScore {
    pub emotion: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct KeywordCount {
    pub keyword: String,
    pub count: usize,
}

/// Aggregate view over a set of scored reviews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AggregateInsights {
    pub overall_sentiment: SentimentLabel,
    pub average_score: f64,
    pub sentiment_distribution: SentimentDistribution,
    pub top_emotions: Vec<EmotionScore>,
    pub common_keywords: Vec<KeywordCount>,
    pub total_reviews: usize,
}

impl AggregateInsights {
    pub fn empty() -> Self {
        Self {
            overall_sentiment: SentimentLabel::Neutral,
            average_score: 0.0,
            sentiment_distribution: SentimentDistribution::default(),
            top_emotions: Vec::new(),
            common_keywords: Vec::new(),
            total_reviews: 0,
        }
    }
}
