use std::collections::HashMap;

use super::aggregate_label;
use crate::models::{AggregateInsights, EmotionScore, KeywordCount, SentimentDistribution, SentimentResult};

const TOP_EMOTIONS: usize = 5;
const TOP_KEYWORDS: usize = 10;

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Aggregates scored reviews. Labels are recomputed from each score with the
/// aggregate threshold so the distribution agrees with the overall label.
pub fn insights(results: &[SentimentResult]) -> AggregateInsights {
    if results.is_empty() {
        return AggregateInsights::empty();
    }

    let mut distribution = SentimentDistribution::default();
    let mut total_score = 0.0;
    // emotion -> (sum, count, first seen)
    let mut emotions: HashMap<&str, (f64, usize, usize)> = HashMap::new();
    // keyword -> (count, first seen)
    let mut keywords: HashMap<&str, (usize, usize)> = HashMap::new();

    for result in results {
        total_score += result.sentiment_score;
        distribution.record(aggregate_label(result.sentiment_score));

        for (emotion, score) in &result.emotions {
            let next = emotions.len();
            let entry = emotions.entry(emotion.as_str()).or_insert((0.0, 0, next));
            entry.0 += score;
            entry.1 += 1;
        }
        for keyword in &result.keywords {
            let next = keywords.len();
            keywords.entry(keyword.as_str()).or_insert((0, next)).0 += 1;
        }
    }

    let mean = total_score / results.len() as f64;

    let mut top_emotions: Vec<(EmotionScore, usize)> = emotions
        .into_iter()
        .map(|(emotion, (sum, count, seen))| {
            (
                EmotionScore {
                    emotion: emotion.to_string(),
                    score: round_to(sum / count as f64, 4),
                },
                seen,
            )
        })
        .collect();
    top_emotions.sort_by(|a, b| b.0.score.total_cmp(&a.0.score).then(a.1.cmp(&b.1)));
    top_emotions.truncate(TOP_EMOTIONS);

    let mut common_keywords: Vec<(KeywordCount, usize)> = keywords
        .into_iter()
        .map(|(keyword, (count, seen))| {
            (
                KeywordCount {
                    keyword: keyword.to_string(),
                    count,
                },
                seen,
            )
        })
        .collect();
    common_keywords.sort_by(|a, b| b.0.count.cmp(&a.0.count).then(a.1.cmp(&b.1)));
    common_keywords.truncate(TOP_KEYWORDS);

    AggregateInsights {
        overall_sentiment: aggregate_label(mean),
        average_score: round_to(mean, 3),
        sentiment_distribution: distribution,
        top_emotions: top_emotions.into_iter().map(|(e, _)| e).collect(),
        common_keywords: common_keywords.into_iter().map(|(k, _)| k).collect(),
        total_reviews: results.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SentimentLabel;
    use std::collections::BTreeMap;

    fn result(score: f64, emotions: &[(&str, f64)], keywords: &[&str]) -> SentimentResult {
        SentimentResult {
            sentiment_score: score,
            sentiment_label: super::super::label_for_score(score),
            confidence: score.abs(),
            emotions: emotions
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect::<BTreeMap<_, _>>(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    #[test]
    fn test_empty_input_is_zero_valued() {
        let out = insights(&[]);
        assert_eq!(out, AggregateInsights::empty());
        assert_eq!(out.total_reviews, 0);
        assert_eq!(out.overall_sentiment, SentimentLabel::Neutral);
    }

    #[test]
    fn test_mean_and_distribution() {
        let reviews = vec![
            result(0.8, &[], &[]),
            result(0.6, &[], &[]),
            result(0.07, &[], &[]),
            result(-0.45, &[], &[]),
        ];
        let out = insights(&reviews);
        assert_eq!(out.total_reviews, 4);
        assert_eq!(out.average_score, 0.255);
        assert_eq!(out.overall_sentiment, SentimentLabel::Positive);
        // 0.07 is positive per text but neutral under the aggregate threshold
        assert_eq!(
            out.sentiment_distribution,
            SentimentDistribution {
                positive: 2,
                neutral: 1,
                negative: 1
            }
        );
    }

    #[test]
    fn test_top_emotions_sorted_and_capped() {
        let reviews = vec![
            result(0.5, &[("joy", 0.9), ("anger", 0.1), ("fear", 0.05)], &[]),
            result(0.5, &[("joy", 0.7), ("surprise", 0.4), ("sadness", 0.2), ("disgust", 0.3)], &[]),
        ];
        let out = insights(&reviews);
        assert_eq!(out.top_emotions.len(), 5);
        assert_eq!(out.top_emotions[0].emotion, "joy");
        assert_eq!(out.top_emotions[0].score, 0.8);
        assert_eq!(out.top_emotions[1].emotion, "surprise");
        assert!(out
            .top_emotions
            .windows(2)
            .all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_common_keywords_by_frequency() {
        let reviews = vec![
            result(0.2, &[], &["pool", "breakfast"]),
            result(0.2, &[], &["breakfast", "staff"]),
            result(0.2, &[], &["breakfast", "pool"]),
        ];
        let out = insights(&reviews);
        let names: Vec<&str> = out.common_keywords.iter().map(|k| k.keyword.as_str()).collect();
        assert_eq!(names, vec!["breakfast", "pool", "staff"]);
        assert_eq!(out.common_keywords[0].count, 3);
    }
}
