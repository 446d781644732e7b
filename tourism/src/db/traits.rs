use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::error::Result;
use crate::models::{ChatMessageRecord, ForecastPoint, LeadRecord, Review, TimeSeriesObservation};

// ---------------------------------------------------------------------------
// Individual store traits
// ---------------------------------------------------------------------------

/// Append-only daily observations, unique per `(business_id, date)`.
#[async_trait]
pub trait ObservationStore: Send + Sync {
    /// Rejects a duplicate `(business_id, date)` with a validation error.
    async fn append_observation(&self, observation: &TimeSeriesObservation) -> Result<()>;

    /// Observations for one business with `start <= date <= end`, ascending by date.
    async fn query_observations(
        &self,
        business_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TimeSeriesObservation>>;

    /// Every observation dated on or after `since` (all of them for `None`),
    /// optionally limited to one business. Ordered by date, then business.
    async fn scan_observations(
        &self,
        since: Option<NaiveDate>,
        business_id: Option<&str>,
    ) -> Result<Vec<TimeSeriesObservation>>;
}

/// Persisted forecast points, kept for accuracy comparison.
#[async_trait]
pub trait ForecastStore: Send + Sync {
    async fn append_forecasts(&self, points: &[ForecastPoint]) -> Result<()>;

    /// At most one point per date: the most recently appended wins.
    async fn query_forecasts(
        &self,
        business_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ForecastPoint>>;
}

#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn create_review(&self, review: &Review) -> Result<()>;
    async fn get_review(&self, id: &str) -> Result<Option<Review>>;
    async fn update_review(&self, review: &Review) -> Result<()>;

    /// Reviews created at or after `since`, oldest first.
    async fn list_reviews(&self, business_id: &str, since: DateTime<Utc>) -> Result<Vec<Review>>;

    /// Oldest unprocessed reviews first.
    async fn list_unprocessed_reviews(
        &self,
        business_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Review>>;
}

/// Chat transcripts and sales leads.
#[async_trait]
pub trait EngagementStore: Send + Sync {
    async fn append_chat_message(&self, message: &ChatMessageRecord) -> Result<()>;
    async fn list_chat_messages(
        &self,
        business_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<ChatMessageRecord>>;

    async fn create_lead(&self, lead: &LeadRecord) -> Result<()>;
    async fn get_lead(&self, id: &str) -> Result<Option<LeadRecord>>;
    /// Replaces the funnel state of an existing lead. `NotFound` if absent.
    async fn update_lead(&self, lead: &LeadRecord) -> Result<()>;

    /// Leads created or converted at or after `since`.
    async fn list_leads(&self, business_id: &str, since: DateTime<Utc>) -> Result<Vec<LeadRecord>>;
}

/// Opaque model bundles keyed by id. A save replaces the whole blob.
#[async_trait]
pub trait ModelStore: Send + Sync {
    async fn save_bundle(&self, bundle_id: &str, blob: &[u8]) -> Result<()>;
    async fn load_bundle(&self, bundle_id: &str) -> Result<Option<Vec<u8>>>;
}

// ---------------------------------------------------------------------------
// Unified backend supertrait
// ---------------------------------------------------------------------------

/// A complete storage backend combining every store plus lifecycle operations.
#[async_trait]
pub trait StorageBackend:
    ObservationStore + ForecastStore + ReviewStore + EngagementStore + ModelStore
{
    /// Sync with remote (e.g. Turso replication). No-op for local-only backends.
    async fn sync(&self) -> Result<()>;

    /// Cheap liveness check for health reporting.
    async fn ping(&self) -> Result<()>;
}
