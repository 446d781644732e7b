use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::db::connection::Database;
use crate::db::repository::{
    BundleRepository, ChatMessageRepository, ForecastRepository, LeadRepository,
    ObservationRepository, ReviewRepository,
};
use crate::db::traits::{
    EngagementStore, ForecastStore, ModelStore, ObservationStore, ReviewStore, StorageBackend,
};
use crate::error::Result;
use crate::models::{ChatMessageRecord, ForecastPoint, LeadRecord, Review, TimeSeriesObservation};

/// Durable backend over a libsql (SQLite / Turso) database.
pub struct LibSqlBackend {
    db: Database,
}

impl LibSqlBackend {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ObservationStore for LibSqlBackend {
    async fn append_observation(&self, observation: &TimeSeriesObservation) -> Result<()> {
        let conn = self.db.connect()?;
        ObservationRepository::append(&conn, observation).await
    }
    async fn query_observations(
        &self,
        business_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TimeSeriesObservation>> {
        let conn = self.db.connect()?;
        ObservationRepository::query_range(&conn, business_id, start, end).await
    }
    async fn scan_observations(
        &self,
        since: Option<NaiveDate>,
        business_id: Option<&str>,
    ) -> Result<Vec<TimeSeriesObservation>> {
        let conn = self.db.connect()?;
        ObservationRepository::scan(&conn, since, business_id).await
    }
}

#[async_trait]
impl ForecastStore for LibSqlBackend {
    async fn append_forecasts(&self, points: &[ForecastPoint]) -> Result<()> {
        let conn = self.db.connect()?;
        ForecastRepository::append_batch(&conn, points).await
    }
    async fn query_forecasts(
        &self,
        business_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ForecastPoint>> {
        let conn = self.db.connect()?;
        ForecastRepository::query_range(&conn, business_id, start, end).await
    }
}

#[async_trait]
impl ReviewStore for LibSqlBackend {
    async fn create_review(&self, review: &Review) -> Result<()> {
        let conn = self.db.connect()?;
        ReviewRepository::create(&conn, review).await
    }
    async fn get_review(&self, id: &str) -> Result<Option<Review>> {
        let conn = self.db.connect()?;
        ReviewRepository::get_by_id(&conn, id).await
    }
    async fn update_review(&self, review: &Review) -> Result<()> {
        let conn = self.db.connect()?;
        ReviewRepository::update(&conn, review).await
    }
    async fn list_reviews(&self, business_id: &str, since: DateTime<Utc>) -> Result<Vec<Review>> {
        let conn = self.db.connect()?;
        ReviewRepository::list_since(&conn, business_id, since).await
    }
    async fn list_unprocessed_reviews(
        &self,
        business_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Review>> {
        let conn = self.db.connect()?;
        ReviewRepository::list_unprocessed(&conn, business_id, limit).await
    }
}

#[async_trait]
impl EngagementStore for LibSqlBackend {
    async fn append_chat_message(&self, message: &ChatMessageRecord) -> Result<()> {
        let conn = self.db.connect()?;
        ChatMessageRepository::create(&conn, message).await
    }
    async fn list_chat_messages(
        &self,
        business_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<ChatMessageRecord>> {
        let conn = self.db.connect()?;
        ChatMessageRepository::list_since(&conn, business_id, since).await
    }
    async fn create_lead(&self, lead: &LeadRecord) -> Result<()> {
        let conn = self.db.connect()?;
        LeadRepository::create(&conn, lead).await
    }
    async fn get_lead(&self, id: &str) -> Result<Option<LeadRecord>> {
        let conn = self.db.connect()?;
        LeadRepository::get_by_id(&conn, id).await
    }
    async fn update_lead(&self, lead: &LeadRecord) -> Result<()> {
        let conn = self.db.connect()?;
        LeadRepository::update(&conn, lead).await
    }
    async fn list_leads(&self, business_id: &str, since: DateTime<Utc>) -> Result<Vec<LeadRecord>> {
        let conn = self.db.connect()?;
        LeadRepository::list_since(&conn, business_id, since).await
    }
}

#[async_trait]
impl ModelStore for LibSqlBackend {
    async fn save_bundle(&self, bundle_id: &str, blob: &[u8]) -> Result<()> {
        let conn = self.db.connect()?;
        BundleRepository::save(&conn, bundle_id, blob).await
    }
    async fn load_bundle(&self, bundle_id: &str) -> Result<Option<Vec<u8>>> {
        let conn = self.db.connect()?;
        BundleRepository::load(&conn, bundle_id).await
    }
}

#[async_trait]
impl StorageBackend for LibSqlBackend {
    async fn sync(&self) -> Result<()> {
        self.db.sync().await
    }

    async fn ping(&self) -> Result<()> {
        let conn = self.db.connect()?;
        conn.query("SELECT 1", ()).await?;
        Ok(())
    }
}
