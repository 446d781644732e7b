use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use nanoid::nanoid;
use tracing::{debug, error, info};
use validator::Validate;

use super::{check_period, round_to};
use crate::db::StorageBackend;
use crate::error::{Result, TourismError};
use crate::models::{NewReview, ProcessingSummary, Review, ReviewStatistics, SentimentDistribution};
use crate::sentiment::SentimentScorer;

/// Upper bound on reviews scored by one [`ReviewService::process_pending`] call.
pub const MAX_PROCESS_BATCH: usize = 500;

pub struct ReviewService {
    store: Arc<dyn StorageBackend>,
    scorer: SentimentScorer,
}

impl ReviewService {
    pub fn new(store: Arc<dyn StorageBackend>, scorer: SentimentScorer) -> Self {
        Self { store, scorer }
    }

    /// Stores a review unprocessed. Sentiment is filled in by [`process_review`](Self::process_review).
    pub async fn create_review(&self, request: NewReview) -> Result<Review> {
        request.validate()?;
        let review = Review::new(nanoid!(), request);
        self.store.create_review(&review).await?;
        debug!(id = %review.id, business_id = %review.business_id, "Review created");
        Ok(review)
    }

    /// Scores one review. Already processed reviews are returned unchanged.
    pub async fn process_review(&self, id: &str) -> Result<Review> {
        let mut review = self
            .store
            .get_review(id)
            .await?
            .ok_or_else(|| TourismError::NotFound(format!("Review {id}")))?;

        if review.processed {
            return Ok(review);
        }

        let result = self.scorer.score(&review.text).await;
        review.apply_sentiment(&result);
        self.store.update_review(&review).await?;
        Ok(review)
    }

    /// Scores up to `limit` unprocessed reviews, oldest first.
    ///
    /// Reviews that cannot be written back are logged and counted as failed.
    pub async fn process_pending(
        &self,
        business_id: Option<&str>,
        limit: usize,
    ) -> Result<ProcessingSummary> {
        let pending = self
            .store
            .list_unprocessed_reviews(business_id, limit.min(MAX_PROCESS_BATCH))
            .await?;
        if pending.is_empty() {
            debug!("No reviews awaiting sentiment processing");
            return Ok(ProcessingSummary::default());
        }

        let texts: Vec<&str> = pending.iter().map(|r| r.text.as_str()).collect();
        let results = self.scorer.score_batch(&texts).await;

        let mut summary = ProcessingSummary::default();
        for (mut review, result) in pending.into_iter().zip(results) {
            review.apply_sentiment(&result);
            match self.store.update_review(&review).await {
                Ok(()) => summary.processed += 1,
                Err(e) => {
                    error!("Failed to store sentiment for review {}: {}", review.id, e);
                    summary.failed += 1;
                }
            }
        }

        info!(
            "Review sentiment processing complete: {} processed, {} failed",
            summary.processed, summary.failed
        );
        Ok(summary)
    }

    /// Counts, mean rating and label distribution, over the last `days` days or all time.
    pub async fn statistics(&self, business_id: &str, days: Option<i64>) -> Result<ReviewStatistics> {
        let since = match days {
            Some(days) => {
                check_period("days", days)?;
                Utc::now() - Duration::days(days)
            }
            None => DateTime::<Utc>::UNIX_EPOCH,
        };
        let reviews = self.store.list_reviews(business_id, since).await?;
        Ok(review_statistics(&reviews))
    }

    pub async fn recent(&self, business_id: &str, days: i64) -> Result<Vec<Review>> {
        check_period("days", days)?;
        self.store
            .list_reviews(business_id, Utc::now() - Duration::days(days))
            .await
    }
}

pub fn review_statistics(reviews: &[Review]) -> ReviewStatistics {
    let ratings: Vec<i32> = reviews.iter().filter_map(|r| r.rating).collect();
    let average_rating = if ratings.is_empty() {
        0.0
    } else {
        round_to(
            ratings.iter().map(|&r| f64::from(r)).sum::<f64>() / ratings.len() as f64,
            2,
        )
    };

    let mut distribution = SentimentDistribution::default();
    let mut processed = 0;
    for review in reviews.iter().filter(|r| r.processed) {
        processed += 1;
        if let Some(label) = review.sentiment_label {
            distribution.record(label);
        }
    }

    ReviewStatistics {
        total_reviews: reviews.len(),
        processed_reviews: processed,
        average_rating,
        sentiment_distribution: distribution,
    }
}
