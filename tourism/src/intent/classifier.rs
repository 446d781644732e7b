use regex::{Regex, RegexBuilder};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use super::entities::EntityExtractor;
use super::taxonomy::{IntentDefinition, TAXONOMY};
use crate::cache::{self, Cache};
use crate::error::{Result, TourismError};
use crate::models::{Entities, Intent, IntentDetail, IntentResult, IntentStatistics};

pub const INTENT_CACHE_NAMESPACE: &str = "intent";

struct CompiledIntent {
    definition: &'static IntentDefinition,
    patterns: Vec<Regex>,
}

impl CompiledIntent {
    fn total_weight(&self) -> usize {
        self.definition.keywords.len() + self.definition.patterns.len() * 2
    }
}

struct IntentScore {
    score: f64,
    matched_keywords: Vec<String>,
    matched_patterns: Vec<String>,
}

/// Keyword and pattern based intent classification over a fixed taxonomy.
pub struct IntentClassifier {
    intents: Vec<CompiledIntent>,
    extractor: EntityExtractor,
    cache: Arc<dyn Cache>,
    ttl: Duration,
}

impl IntentClassifier {
    /// Compiles every taxonomy pattern up front.
    pub fn new(cache: Arc<dyn Cache>, ttl: Duration) -> Result<Self> {
        let intents = TAXONOMY
            .iter()
            .map(|definition| {
                let patterns = definition
                    .patterns
                    .iter()
                    .map(|pattern| {
                        RegexBuilder::new(pattern)
                            .case_insensitive(true)
                            .build()
                            .map_err(|e| {
                                TourismError::Internal(format!("Invalid intent pattern '{pattern}': {e}"))
                            })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(CompiledIntent {
                    definition,
                    patterns,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            intents,
            extractor: EntityExtractor::new()?,
            cache,
            ttl,
        })
    }

    /// Classifies `text`, consulting the cache first.
    pub async fn classify(&self, text: &str) -> IntentResult {
        let key = cache::hashed_key(INTENT_CACHE_NAMESPACE, text);
        if let Some(cached) = cache::get_json::<IntentResult>(self.cache.as_ref(), &key).await {
            return cached;
        }

        let result = self.classify_uncached(text);
        cache::set_json(self.cache.as_ref(), &key, &result, self.ttl).await;
        result
    }

    pub fn classify_uncached(&self, text: &str) -> IntentResult {
        let lower = text.to_lowercase();
        let mut all_scores = BTreeMap::new();
        let mut best: Option<(&CompiledIntent, IntentScore)> = None;

        for compiled in &self.intents {
            let scored = score_intent(compiled, &lower);
            all_scores.insert(compiled.definition.intent.to_string(), scored.score);

            let better = best
                .as_ref()
                .map_or(true, |(_, current)| scored.score > current.score);
            if better {
                best = Some((compiled, scored));
            }
        }

        match best {
            Some((compiled, scored)) if scored.score > 0.0 && scored.score >= compiled.definition.threshold => {
                IntentResult {
                    intent: compiled.definition.intent,
                    confidence: (scored.score * 1000.0).round() / 1000.0,
                    matched_keywords: scored.matched_keywords,
                    matched_patterns: scored.matched_patterns,
                    all_scores,
                }
            }
            _ => IntentResult::unknown(all_scores),
        }
    }

    pub fn extract_entities(&self, text: &str, intent: Intent) -> Entities {
        self.extractor.extract(text, intent)
    }

    pub fn statistics(&self) -> IntentStatistics {
        IntentStatistics {
            total_intents: self.intents.len(),
            intent_names: self.intents.iter().map(|c| c.definition.intent).collect(),
            intent_details: self
                .intents
                .iter()
                .map(|c| {
                    (
                        c.definition.intent.to_string(),
                        IntentDetail {
                            keywords_count: c.definition.keywords.len(),
                            patterns_count: c.definition.patterns.len(),
                            threshold: c.definition.threshold,
                        },
                    )
                })
                .collect(),
        }
    }
}

fn score_intent(compiled: &CompiledIntent, lower: &str) -> IntentScore {
    let matched_keywords: Vec<String> = compiled
        .definition
        .keywords
        .iter()
        .filter(|kw| lower.contains(*kw))
        .map(|kw| kw.to_string())
        .collect();

    let matched_patterns: Vec<String> = compiled
        .patterns
        .iter()
        .zip(compiled.definition.patterns)
        .filter(|(re, _)| re.is_match(lower))
        .map(|(_, source)| source.to_string())
        .collect();

    let raw = matched_keywords.len() + matched_patterns.len() * 2;
    let total = compiled.total_weight();
    let score = if total == 0 {
        0.0
    } else {
        raw as f64 / total as f64
    };

    IntentScore {
        score,
        matched_keywords,
        matched_patterns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;

    fn classifier() -> IntentClassifier {
        IntentClassifier::new(Arc::new(MemoryCache::new(64)), Duration::from_secs(1800)).unwrap()
    }

    #[test]
    fn test_no_matches_is_unknown() {
        let result = classifier().classify_uncached("Xylophone quartet");
        assert_eq!(result.intent, Intent::Unknown);
        assert_eq!(result.confidence, 0.0);
        assert!(result.matched_keywords.is_empty());
        assert!(result.matched_patterns.is_empty());
        assert_eq!(result.all_scores.len(), 10);
        assert!(result.all_scores.values().all(|s| *s == 0.0));
    }

    #[test]
    fn test_booking_request() {
        let result = classifier().classify_uncached(
            "I want to book a reservation, is a room available? Please schedule check in for Friday",
        );
        assert_eq!(result.intent, Intent::Booking);
        // (4 keywords + 3 patterns * 2) / (6 + 3 * 2)
        assert_eq!(result.confidence, 0.833);
        assert!(result.matched_keywords.contains(&"book".to_string()));
        assert_eq!(result.matched_patterns.len(), 3);
    }

    #[test]
    fn test_information_request() {
        let result = classifier()
            .classify_uncached("What are the opening hours and where is the location? Tell me some info");
        assert_eq!(result.intent, Intent::Information);
        assert!(result.confidence >= 0.5);
    }

    #[test]
    fn test_best_intent_below_its_threshold_is_unknown() {
        // greeting scores 0.3 and needs 0.9
        let result = classifier().classify_uncached("hello");
        assert_eq!(result.intent, Intent::Unknown);
        assert_eq!(result.confidence, 0.0);
        assert!(result.all_scores["greeting"] > 0.0);
    }

    #[tokio::test]
    async fn test_classify_caches_by_text() {
        let cache = Arc::new(MemoryCache::new(8));
        let classifier = IntentClassifier::new(cache.clone(), Duration::from_secs(1800)).unwrap();

        let first = classifier.classify("Where is the bus station?").await;
        assert_eq!(cache.len(), 1);
        let second = classifier.classify("Where is the bus station?").await;
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_statistics_cover_taxonomy() {
        let stats = classifier().statistics();
        assert_eq!(stats.total_intents, 10);
        assert_eq!(stats.intent_names[0], Intent::Booking);
        assert_eq!(stats.intent_details["pricing"].patterns_count, 4);
        assert_eq!(stats.intent_details["goodbye"].threshold, 0.9);
    }
}
