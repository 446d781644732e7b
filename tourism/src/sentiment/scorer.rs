use futures::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::{
    extract_keywords, label_for_score, map_model_label, EmotionModel, LexiconAnalyzer,
    PolarityAnalyzer, SentimentModel, EMOTION_LABELS,
};
use crate::cache::{self, Cache};
use crate::error::Result;
use crate::models::{AggregateInsights, SentimentLabel, SentimentResult};

pub const SENTIMENT_CACHE_NAMESPACE: &str = "sentiment";

/// Scores free text, memoizing results in the shared cache.
#[derive(Clone)]
pub struct SentimentScorer {
    analyzer: Arc<dyn PolarityAnalyzer>,
    advanced: Option<Arc<dyn SentimentModel>>,
    emotion: Option<Arc<dyn EmotionModel>>,
    cache: Arc<dyn Cache>,
    ttl: Duration,
}

impl SentimentScorer {
    pub fn new(cache: Arc<dyn Cache>, ttl: Duration) -> Self {
        Self {
            analyzer: Arc::new(LexiconAnalyzer::new()),
            advanced: None,
            emotion: None,
            cache,
            ttl,
        }
    }

    pub fn with_analyzer(mut self, analyzer: Arc<dyn PolarityAnalyzer>) -> Self {
        self.analyzer = analyzer;
        self
    }

    pub fn with_advanced_model(mut self, model: Arc<dyn SentimentModel>) -> Self {
        self.advanced = Some(model);
        self
    }

    pub fn with_emotion_model(mut self, model: Arc<dyn EmotionModel>) -> Self {
        self.emotion = Some(model);
        self
    }

    pub fn has_advanced_model(&self) -> bool {
        self.advanced.is_some()
    }

    pub fn has_emotion_model(&self) -> bool {
        self.emotion.is_some()
    }

    /// Scores `text`. Never fails: analyzer errors degrade to the neutral placeholder.
    pub async fn score(&self, text: &str) -> SentimentResult {
        if text.trim().is_empty() {
            return SentimentResult::neutral();
        }

        let key = cache::hashed_key(SENTIMENT_CACHE_NAMESPACE, text);
        if let Some(cached) = cache::get_json::<SentimentResult>(self.cache.as_ref(), &key).await {
            return cached;
        }

        match self.compute(text).await {
            Ok(result) => {
                cache::set_json(self.cache.as_ref(), &key, &result, self.ttl).await;
                result
            }
            Err(e) => {
                warn!(error = %e, "sentiment scoring failed, returning neutral result");
                SentimentResult::neutral()
            }
        }
    }

    /// Scores every text concurrently. Output order matches input order.
    pub async fn score_batch<S: AsRef<str>>(&self, texts: &[S]) -> Vec<SentimentResult> {
        join_all(texts.iter().map(|text| self.score(text.as_ref()))).await
    }

    pub fn insights(&self, results: &[SentimentResult]) -> AggregateInsights {
        super::insights(results)
    }

    async fn compute(&self, text: &str) -> Result<SentimentResult> {
        let score = self.analyzer.polarity(text)?.clamp(-1.0, 1.0);
        let mut result = SentimentResult {
            sentiment_score: score,
            sentiment_label: label_for_score(score),
            confidence: score.abs(),
            emotions: BTreeMap::new(),
            keywords: Vec::new(),
        };

        if let Some(model) = &self.advanced {
            self.apply_advanced(model.as_ref(), text, &mut result).await;
        }

        if let Some(model) = &self.emotion {
            result.emotions = self.detect_emotions(model.as_ref(), text).await;
        }

        result.keywords = extract_keywords(text);
        Ok(result)
    }

    async fn apply_advanced(&self, model: &dyn SentimentModel, text: &str, result: &mut SentimentResult) {
        let scores = match model.classify(text).await {
            Ok(scores) => scores,
            Err(e) => {
                warn!(error = %e, "advanced sentiment model unavailable, keeping lexicon score");
                return;
            }
        };

        let Some(best) = scores.iter().max_by(|a, b| a.score.total_cmp(&b.score)) else {
            return;
        };
        let Some(label) = map_model_label(&best.label) else {
            warn!(label = %best.label, "unrecognized sentiment model label");
            return;
        };

        let model_confidence = best.score.clamp(0.0, 1.0);
        if model_confidence > result.confidence {
            debug!(label = %label, confidence = model_confidence, "advanced model overrides lexicon");
            result.sentiment_label = label;
            result.sentiment_score = match label {
                SentimentLabel::Positive => model_confidence,
                SentimentLabel::Negative => -model_confidence,
                SentimentLabel::Neutral => 0.0,
            };
        }
        result.confidence = result.confidence.max(model_confidence);
    }

    async fn detect_emotions(&self, model: &dyn EmotionModel, text: &str) -> BTreeMap<String, f64> {
        match model.emotions(text).await {
            Ok(scores) => scores
                .into_iter()
                .filter_map(|s| {
                    let label = s.label.to_lowercase();
                    EMOTION_LABELS
                        .contains(&label.as_str())
                        .then_some((label, s.score))
                })
                .collect(),
            Err(e) => {
                warn!(error = %e, "emotion model unavailable, omitting emotions");
                BTreeMap::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::error::TourismError;
    use crate::sentiment::LabelScore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingAnalyzer {
        calls: AtomicUsize,
    }

    impl PolarityAnalyzer for CountingAnalyzer {
        fn polarity(&self, text: &str) -> Result<f64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            LexiconAnalyzer::new().polarity(text)
        }
    }

    struct FailingAnalyzer;

    impl PolarityAnalyzer for FailingAnalyzer {
        fn polarity(&self, text: &str) -> Result<f64> {
            if text.contains("boom") {
                Err(TourismError::Internal("analyzer crashed".into()))
            } else {
                Ok(0.5)
            }
        }
    }

    struct FixedModel(Vec<LabelScore>);

    #[async_trait]
    impl SentimentModel for FixedModel {
        async fn classify(&self, _text: &str) -> Result<Vec<LabelScore>> {
            Ok(self.0.clone())
        }
    }

    #[async_trait]
    impl EmotionModel for FixedModel {
        async fn emotions(&self, _text: &str) -> Result<Vec<LabelScore>> {
            Ok(self.0.clone())
        }
    }

    struct DownModel;

    #[async_trait]
    impl SentimentModel for DownModel {
        async fn classify(&self, _text: &str) -> Result<Vec<LabelScore>> {
            Err(TourismError::DependencyUnavailable("offline".into()))
        }
    }

    #[async_trait]
    impl EmotionModel for DownModel {
        async fn emotions(&self, _text: &str) -> Result<Vec<LabelScore>> {
            Err(TourismError::DependencyUnavailable("offline".into()))
        }
    }

    fn label(label: &str, score: f64) -> LabelScore {
        LabelScore {
            label: label.to_string(),
            score,
        }
    }

    fn scorer() -> SentimentScorer {
        SentimentScorer::new(Arc::new(MemoryCache::new(64)), Duration::from_secs(3600))
    }

    #[tokio::test]
    async fn test_empty_text_is_neutral_and_skips_analyzer() {
        let analyzer = Arc::new(CountingAnalyzer {
            calls: AtomicUsize::new(0),
        });
        let scorer = scorer().with_analyzer(analyzer.clone());

        for text in ["", "   \n\t"] {
            let result = scorer.score(text).await;
            assert_eq!(result.sentiment_label, SentimentLabel::Neutral);
            assert_eq!(result.sentiment_score, 0.0);
            assert_eq!(result.confidence, 0.0);
            assert!(result.keywords.is_empty());
        }
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_repeat_calls_hit_cache() {
        let analyzer = Arc::new(CountingAnalyzer {
            calls: AtomicUsize::new(0),
        });
        let scorer = scorer().with_analyzer(analyzer.clone());

        let first = scorer.score("The pool was lovely").await;
        let second = scorer.score("The pool was lovely").await;

        assert_eq!(first, second);
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_cache_recomputes() {
        let analyzer = Arc::new(CountingAnalyzer {
            calls: AtomicUsize::new(0),
        });
        let scorer = SentimentScorer::new(Arc::new(MemoryCache::new(8)), Duration::ZERO)
            .with_analyzer(analyzer.clone());

        scorer.score("Lovely view").await;
        scorer.score("Lovely view").await;
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_advanced_model_overrides_when_more_confident() {
        let scorer = scorer().with_advanced_model(Arc::new(FixedModel(vec![
            label("LABEL_0", 0.02),
            label("LABEL_1", 0.03),
            label("LABEL_2", 0.95),
        ])));
        assert!(scorer.has_advanced_model());
        assert!(!scorer.has_emotion_model());

        let result = scorer.score("The room was okay").await;
        assert_eq!(result.sentiment_label, SentimentLabel::Positive);
        assert_eq!(result.sentiment_score, 0.95);
        assert_eq!(result.confidence, 0.95);
    }

    #[tokio::test]
    async fn test_advanced_model_ignored_when_less_confident() {
        let scorer = scorer().with_advanced_model(Arc::new(FixedModel(vec![label("neutral", 0.4)])));

        let result = scorer.score("This hotel is amazing, the staff was wonderful").await;
        assert_eq!(result.sentiment_label, SentimentLabel::Positive);
        assert!(result.sentiment_score > 0.4);
        assert_eq!(result.confidence, result.sentiment_score.abs());
    }

    #[tokio::test]
    async fn test_unavailable_models_fall_back_silently() {
        let scorer = scorer()
            .with_advanced_model(Arc::new(DownModel))
            .with_emotion_model(Arc::new(DownModel));

        let result = scorer.score("Terrible experience, the room was awful").await;
        assert_eq!(result.sentiment_label, SentimentLabel::Negative);
        assert!(result.emotions.is_empty());
    }

    #[tokio::test]
    async fn test_emotions_restricted_to_known_labels() {
        let scorer = scorer().with_emotion_model(Arc::new(FixedModel(vec![
            label("Joy", 0.8),
            label("anger", 0.1),
            label("boredom", 0.1),
        ])));

        let result = scorer.score("Lovely stay").await;
        assert_eq!(result.emotions.len(), 2);
        assert_eq!(result.emotions.get("joy"), Some(&0.8));
        assert!(!result.emotions.contains_key("boredom"));
    }

    #[tokio::test]
    async fn test_batch_preserves_order_and_degrades_failures() {
        let scorer = scorer().with_analyzer(Arc::new(FailingAnalyzer));
        let texts = vec!["fine day", "boom goes the boiler", "", "quiet room"];

        let results = scorer.score_batch(&texts).await;
        assert_eq!(results.len(), texts.len());
        assert_eq!(results[0].sentiment_score, 0.5);
        assert_eq!(results[1], SentimentResult::neutral());
        assert_eq!(results[2], SentimentResult::neutral());
        assert_eq!(results[3].sentiment_score, 0.5);
    }
}
