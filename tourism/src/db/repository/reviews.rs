use chrono::{DateTime, Utc};
use libsql::{params, Connection};

use super::{format_timestamp, parse_timestamp};
use crate::error::{Result, TourismError};
use crate::models::Review;

const SELECT_COLUMNS: &str = r#"
    SELECT id, business_id, text, rating, source, processed, sentiment_score,
           sentiment_label, confidence, emotions, keywords, created_at
    FROM reviews
"#;

pub struct ReviewRepository;

impl ReviewRepository {
    pub async fn create(conn: &Connection, review: &Review) -> Result<()> {
        conn.execute(
            r#"
            INSERT INTO reviews (
                id, business_id, text, rating, source, processed, sentiment_score,
                sentiment_label, confidence, emotions, keywords, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                review.id.clone(),
                review.business_id.clone(),
                review.text.clone(),
                review.rating.map(i64::from),
                review.source.clone(),
                review.processed as i64,
                review.sentiment_score,
                review.sentiment_label.map(|l| l.to_string()),
                review.confidence,
                serde_json::to_string(&review.emotions)?,
                serde_json::to_string(&review.keywords)?,
                format_timestamp(&review.created_at),
            ],
        )
        .await?;

        Ok(())
    }

    pub async fn get_by_id(conn: &Connection, id: &str) -> Result<Option<Review>> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
        let mut rows = conn.query(&sql, params![id]).await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(Self::row_to_review(&row)?))
        } else {
            Ok(None)
        }
    }

    /// Writes the sentiment fields. Text, rating and source are immutable.
    pub async fn update(conn: &Connection, review: &Review) -> Result<()> {
        let updated = conn
            .execute(
                r#"
                UPDATE reviews SET
                    processed = ?2,
                    sentiment_score = ?3,
                    sentiment_label = ?4,
                    confidence = ?5,
                    emotions = ?6,
                    keywords = ?7
                WHERE id = ?1
                "#,
                params![
                    review.id.clone(),
                    review.processed as i64,
                    review.sentiment_score,
                    review.sentiment_label.map(|l| l.to_string()),
                    review.confidence,
                    serde_json::to_string(&review.emotions)?,
                    serde_json::to_string(&review.keywords)?,
                ],
            )
            .await?;

        if updated == 0 {
            return Err(TourismError::NotFound(format!("Review {}", review.id)));
        }
        Ok(())
    }

    pub async fn list_since(
        conn: &Connection,
        business_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<Review>> {
        let sql = format!(
            "{SELECT_COLUMNS} WHERE business_id = ?1 AND created_at >= ?2 ORDER BY created_at ASC"
        );
        let mut rows = conn
            .query(&sql, params![business_id, format_timestamp(&since)])
            .await?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            results.push(Self::row_to_review(&row)?);
        }
        Ok(results)
    }

    pub async fn list_unprocessed(
        conn: &Connection,
        business_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Review>> {
        let sql = format!(
            "{SELECT_COLUMNS} WHERE processed = 0 AND (?1 IS NULL OR business_id = ?1) \
             ORDER BY created_at ASC LIMIT ?2"
        );
        let mut rows = conn
            .query(&sql, params![business_id.map(str::to_string), limit as i64])
            .await?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            results.push(Self::row_to_review(&row)?);
        }
        Ok(results)
    }

    fn row_to_review(row: &libsql::Row) -> Result<Review> {
        let label: Option<String> = row.get(7)?;
        let emotions: Option<String> = row.get(9)?;
        let keywords: Option<String> = row.get(10)?;

        Ok(Review {
            id: row.get(0)?,
            business_id: row.get(1)?,
            text: row.get(2)?,
            rating: row.get::<Option<i64>>(3)?.map(|r| r as i32),
            source: row.get(4)?,
            processed: row.get::<i64>(5)? != 0,
            sentiment_score: row.get(6)?,
            sentiment_label: label.and_then(|l| l.parse().ok()),
            confidence: row.get(8)?,
            emotions: emotions
                .and_then(|e| serde_json::from_str(&e).ok())
                .unwrap_or_default(),
            keywords: keywords
                .and_then(|k| serde_json::from_str(&k).ok())
                .unwrap_or_default(),
            created_at: parse_timestamp(&row.get::<String>(11)?),
        })
    }
}
