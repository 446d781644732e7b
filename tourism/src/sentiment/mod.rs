//! Review and message sentiment scoring.
//!
//! The primary path is a lexicon-based compound polarity score that is always
//! available. Two optional model paths can refine it: an advanced sentiment
//! classifier that may override the label when it is more confident, and an
//! emotion classifier. Both are injected at construction and checked with
//! [`SentimentScorer::has_advanced_model`] / [`SentimentScorer::has_emotion_model`].

mod insights;
mod keywords;
mod lexicon;
mod remote;
mod scorer;

pub use insights::insights;
pub use keywords::extract_keywords;
pub use lexicon::LexiconAnalyzer;
pub use remote::HostedClassifier;
pub use scorer::{SentimentScorer, SENTIMENT_CACHE_NAMESPACE};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::SentimentLabel;

/// Per-text classification threshold: `score >= 0.05` is positive, `score <= -0.05` negative.
pub const TEXT_THRESHOLD: f64 = 0.05;

/// Aggregate classification threshold: a mean above `0.1` is positive, below `-0.1` negative.
/// Also used for per-label counts in [`insights`] and for trend classification.
pub const AGGREGATE_THRESHOLD: f64 = 0.1;

/// Labels accepted from an emotion model. Anything else is dropped.
pub const EMOTION_LABELS: [&str; 7] = [
    "anger", "disgust", "fear", "joy", "neutral", "sadness", "surprise",
];

pub fn label_for_score(score: f64) -> SentimentLabel {
    if score >= TEXT_THRESHOLD {
        SentimentLabel::Positive
    } else if score <= -TEXT_THRESHOLD {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    }
}

pub fn aggregate_label(mean: f64) -> SentimentLabel {
    if mean > AGGREGATE_THRESHOLD {
        SentimentLabel::Positive
    } else if mean < -AGGREGATE_THRESHOLD {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    }
}

/// Maps a classifier label to a sentiment label.
///
/// Accepts `LABEL_0`/`LABEL_1`/`LABEL_2` (negative, neutral, positive) and the
/// label names themselves, case-insensitively.
pub fn map_model_label(label: &str) -> Option<SentimentLabel> {
    match label.trim().to_lowercase().as_str() {
        "label_0" => Some(SentimentLabel::Negative),
        "label_1" => Some(SentimentLabel::Neutral),
        "label_2" => Some(SentimentLabel::Positive),
        other => other.parse().ok(),
    }
}

/// One `(label, score)` pair from a text classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

/// Compound polarity in `[-1, 1]`.
pub trait PolarityAnalyzer: Send + Sync {
    fn polarity(&self, text: &str) -> Result<f64>;
}

#[async_trait]
pub trait SentimentModel: Send + Sync {
    /// Scores for every sentiment class the model knows.
    async fn classify(&self, text: &str) -> Result<Vec<LabelScore>>;
}

#[async_trait]
pub trait EmotionModel: Send + Sync {
    async fn emotions(&self, text: &str) -> Result<Vec<LabelScore>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_threshold_boundaries() {
        assert_eq!(label_for_score(0.05), SentimentLabel::Positive);
        assert_eq!(label_for_score(0.0499), SentimentLabel::Neutral);
        assert_eq!(label_for_score(-0.05), SentimentLabel::Negative);
    }

    #[test]
    fn test_aggregate_threshold_is_strict() {
        assert_eq!(aggregate_label(0.1), SentimentLabel::Neutral);
        assert_eq!(aggregate_label(0.11), SentimentLabel::Positive);
        assert_eq!(aggregate_label(-0.2), SentimentLabel::Negative);
    }

    #[test]
    fn test_model_label_mapping() {
        assert_eq!(map_model_label("LABEL_0"), Some(SentimentLabel::Negative));
        assert_eq!(map_model_label("label_1"), Some(SentimentLabel::Neutral));
        assert_eq!(map_model_label("LABEL_2"), Some(SentimentLabel::Positive));
        assert_eq!(map_model_label("Positive"), Some(SentimentLabel::Positive));
        assert_eq!(map_model_label("NEGATIVE"), Some(SentimentLabel::Negative));
        assert_eq!(map_model_label("LABEL_7"), None);
        assert_eq!(map_model_label("mixed"), None);
    }
}
