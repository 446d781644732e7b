use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use crate::db::traits::{
    EngagementStore, ForecastStore, ModelStore, ObservationStore, ReviewStore, StorageBackend,
};
use crate::error::{Result, TourismError};
use crate::models::{ChatMessageRecord, ForecastPoint, LeadRecord, Review, TimeSeriesObservation};

#[derive(Default)]
struct Tables {
    /// Keyed by `(business_id, date)`.
    observations: BTreeMap<(String, NaiveDate), TimeSeriesObservation>,
    /// Append order is the recency order.
    forecasts: Vec<ForecastPoint>,
    reviews: Vec<Review>,
    chat_messages: Vec<ChatMessageRecord>,
    leads: Vec<LeadRecord>,
    bundles: HashMap<String, Vec<u8>>,
}

/// Process-local backend for tests and demos. Nothing survives a restart.
#[derive(Default)]
pub struct InMemoryBackend {
    tables: RwLock<Tables>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ObservationStore for InMemoryBackend {
    async fn append_observation(&self, observation: &TimeSeriesObservation) -> Result<()> {
        let mut tables = self.tables.write().await;
        let key = (observation.business_id.clone(), observation.date);
        if tables.observations.contains_key(&key) {
            return Err(TourismError::Validation(format!(
                "Observation for business '{}' on {} already exists",
                observation.business_id, observation.date
            )));
        }
        tables.observations.insert(key, observation.clone());
        Ok(())
    }

    async fn query_observations(
        &self,
        business_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TimeSeriesObservation>> {
        if start > end {
            return Ok(Vec::new());
        }
        let tables = self.tables.read().await;
        let from = (business_id.to_string(), start);
        let to = (business_id.to_string(), end);
        Ok(tables
            .observations
            .range(from..=to)
            .map(|(_, obs)| obs.clone())
            .collect())
    }

    async fn scan_observations(
        &self,
        since: Option<NaiveDate>,
        business_id: Option<&str>,
    ) -> Result<Vec<TimeSeriesObservation>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<TimeSeriesObservation> = tables
            .observations
            .values()
            .filter(|obs| since.map_or(true, |s| obs.date >= s))
            .filter(|obs| business_id.map_or(true, |b| obs.business_id == b))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.business_id.cmp(&b.business_id)));
        Ok(rows)
    }
}

#[async_trait]
impl ForecastStore for InMemoryBackend {
    async fn append_forecasts(&self, points: &[ForecastPoint]) -> Result<()> {
        self.tables.write().await.forecasts.extend_from_slice(points);
        Ok(())
    }

    async fn query_forecasts(
        &self,
        business_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ForecastPoint>> {
        let tables = self.tables.read().await;
        let mut latest = BTreeMap::new();
        for point in tables
            .forecasts
            .iter()
            .filter(|p| p.business_id == business_id && p.date >= start && p.date <= end)
        {
            latest.insert(point.date, point.clone());
        }
        Ok(latest.into_values().collect())
    }
}

#[async_trait]
impl ReviewStore for InMemoryBackend {
    async fn create_review(&self, review: &Review) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.reviews.iter().any(|r| r.id == review.id) {
            return Err(TourismError::Validation(format!(
                "Review {} already exists",
                review.id
            )));
        }
        tables.reviews.push(review.clone());
        Ok(())
    }

    async fn get_review(&self, id: &str) -> Result<Option<Review>> {
        let tables = self.tables.read().await;
        Ok(tables.reviews.iter().find(|r| r.id == id).cloned())
    }

    async fn update_review(&self, review: &Review) -> Result<()> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .reviews
            .iter_mut()
            .find(|r| r.id == review.id)
            .ok_or_else(|| TourismError::NotFound(format!("Review {}", review.id)))?;
        *stored = review.clone();
        Ok(())
    }

    async fn list_reviews(&self, business_id: &str, since: DateTime<Utc>) -> Result<Vec<Review>> {
        let tables = self.tables.read().await;
        let mut reviews: Vec<Review> = tables
            .reviews
            .iter()
            .filter(|r| r.business_id == business_id && r.created_at >= since)
            .cloned()
            .collect();
        reviews.sort_by_key(|r| r.created_at);
        Ok(reviews)
    }

    async fn list_unprocessed_reviews(
        &self,
        business_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Review>> {
        let tables = self.tables.read().await;
        let mut pending: Vec<Review> = tables
            .reviews
            .iter()
            .filter(|r| !r.processed && business_id.map_or(true, |b| r.business_id == b))
            .cloned()
            .collect();
        pending.sort_by_key(|r| r.created_at);
        pending.truncate(limit);
        Ok(pending)
    }
}

#[async_trait]
impl EngagementStore for InMemoryBackend {
    async fn append_chat_message(&self, message: &ChatMessageRecord) -> Result<()> {
        self.tables.write().await.chat_messages.push(message.clone());
        Ok(())
    }

    async fn list_chat_messages(
        &self,
        business_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<ChatMessageRecord>> {
        let tables = self.tables.read().await;
        let mut messages: Vec<ChatMessageRecord> = tables
            .chat_messages
            .iter()
            .filter(|m| m.business_id == business_id && m.created_at >= since)
            .cloned()
            .collect();
        messages.sort_by_key(|m| m.created_at);
        Ok(messages)
    }

    async fn create_lead(&self, lead: &LeadRecord) -> Result<()> {
        self.tables.write().await.leads.push(lead.clone());
        Ok(())
    }

    async fn get_lead(&self, id: &str) -> Result<Option<LeadRecord>> {
        let tables = self.tables.read().await;
        Ok(tables.leads.iter().find(|l| l.id == id).cloned())
    }

    async fn update_lead(&self, lead: &LeadRecord) -> Result<()> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .leads
            .iter_mut()
            .find(|l| l.id == lead.id)
            .ok_or_else(|| TourismError::NotFound(format!("Lead {}", lead.id)))?;
        *stored = lead.clone();
        Ok(())
    }

    async fn list_leads(&self, business_id: &str, since: DateTime<Utc>) -> Result<Vec<LeadRecord>> {
        let tables = self.tables.read().await;
        let mut leads: Vec<LeadRecord> = tables
            .leads
            .iter()
            .filter(|l| l.business_id == business_id)
            .filter(|l| l.created_at >= since || l.converted_at.is_some_and(|c| c >= since))
            .cloned()
            .collect();
        leads.sort_by_key(|l| l.created_at);
        Ok(leads)
    }
}

#[async_trait]
impl ModelStore for InMemoryBackend {
    async fn save_bundle(&self, bundle_id: &str, blob: &[u8]) -> Result<()> {
        self.tables
            .write()
            .await
            .bundles
            .insert(bundle_id.to_string(), blob.to_vec());
        Ok(())
    }

    async fn load_bundle(&self, bundle_id: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.tables.read().await.bundles.get(bundle_id).cloned())
    }
}

#[async_trait]
impl StorageBackend for InMemoryBackend {
    async fn sync(&self) -> Result<()> {
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 8, d).unwrap()
    }

    #[tokio::test]
    async fn test_duplicate_observation_is_rejected() {
        let backend = InMemoryBackend::new();
        let obs = TimeSeriesObservation::new("hotel-1", date(1), 10);
        backend.append_observation(&obs).await.unwrap();
        assert!(matches!(
            backend.append_observation(&obs).await,
            Err(TourismError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_query_range_is_per_business() {
        let backend = InMemoryBackend::new();
        for (b, d) in [("a", 1), ("a", 2), ("a", 5), ("ab", 2), ("b", 2)] {
            backend
                .append_observation(&TimeSeriesObservation::new(b, date(d), 1))
                .await
                .unwrap();
        }

        let rows = backend.query_observations("a", date(1), date(4)).await.unwrap();
        assert_eq!(rows.iter().map(|o| o.date).collect::<Vec<_>>(), vec![date(1), date(2)]);
        assert!(backend.query_observations("a", date(4), date(1)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_latest_forecast_wins() {
        let backend = InMemoryBackend::new();
        let mut point = ForecastPoint {
            date: date(3),
            business_id: "a".to_string(),
            predicted_visitors: 10,
            confidence_lower: 5,
            confidence_upper: 15,
            model_used: "random_forest".to_string(),
        };
        backend.append_forecasts(&[point.clone()]).await.unwrap();
        point.predicted_visitors = 12;
        backend.append_forecasts(&[point.clone()]).await.unwrap();

        let stored = backend.query_forecasts("a", date(1), date(31)).await.unwrap();
        assert_eq!(stored, vec![point]);
    }
}
