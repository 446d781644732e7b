use chrono::{NaiveDate, Utc};
use libsql::{params, Connection};
use std::collections::BTreeMap;

use super::{format_timestamp, parse_date, DATE_FORMAT};
use crate::error::Result;
use crate::models::ForecastPoint;

pub struct ForecastRepository;

impl ForecastRepository {
    /// Appends all points in one transaction.
    pub async fn append_batch(conn: &Connection, points: &[ForecastPoint]) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }
        let created_at = format_timestamp(&Utc::now());
        let tx = conn.transaction().await?;
        for point in points {
            tx.execute(
                r#"
                INSERT INTO forecasts (
                    business_id, date, predicted_visitors, confidence_lower,
                    confidence_upper, model_used, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
                params![
                    point.business_id.clone(),
                    point.date.format(DATE_FORMAT).to_string(),
                    point.predicted_visitors,
                    point.confidence_lower,
                    point.confidence_upper,
                    point.model_used.clone(),
                    created_at.clone(),
                ],
            )
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Latest appended point per date within `[start, end]`, ascending by date.
    pub async fn query_range(
        conn: &Connection,
        business_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ForecastPoint>> {
        let mut rows = conn
            .query(
                r#"
                SELECT business_id, date, predicted_visitors, confidence_lower,
                       confidence_upper, model_used
                FROM forecasts
                WHERE business_id = ?1 AND date >= ?2 AND date <= ?3
                ORDER BY id ASC
                "#,
                params![
                    business_id,
                    start.format(DATE_FORMAT).to_string(),
                    end.format(DATE_FORMAT).to_string(),
                ],
            )
            .await?;

        let mut latest = BTreeMap::new();
        while let Some(row) = rows.next().await? {
            let point = Self::row_to_point(&row)?;
            latest.insert(point.date, point);
        }
        Ok(latest.into_values().collect())
    }

    fn row_to_point(row: &libsql::Row) -> Result<ForecastPoint> {
        Ok(ForecastPoint {
            business_id: row.get(0)?,
            date: parse_date(&row.get::<String>(1)?)?,
            predicted_visitors: row.get(2)?,
            confidence_lower: row.get(3)?,
            confidence_upper: row.get(4)?,
            model_used: row.get(5)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::setup_test_db;

    fn point(day: u32, predicted: i64) -> ForecastPoint {
        ForecastPoint {
            date: NaiveDate::from_ymd_opt(2024, 7, day).unwrap(),
            business_id: "tour-co".to_string(),
            predicted_visitors: predicted,
            confidence_lower: predicted - 10,
            confidence_upper: predicted + 10,
            model_used: "random_forest".to_string(),
        }
    }

    #[tokio::test]
    async fn test_latest_point_wins_per_date() {
        let conn = setup_test_db().await;
        ForecastRepository::append_batch(&conn, &[point(1, 100), point(2, 110)])
            .await
            .unwrap();
        ForecastRepository::append_batch(&conn, &[point(2, 150)])
            .await
            .unwrap();

        let start = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 7, 31).unwrap();
        let points = ForecastRepository::query_range(&conn, "tour-co", start, end)
            .await
            .unwrap();
        assert_eq!(points, vec![point(1, 100), point(2, 150)]);
    }

    #[tokio::test]
    async fn test_empty_batch_is_noop() {
        let conn = setup_test_db().await;
        ForecastRepository::append_batch(&conn, &[]).await.unwrap();
    }
}
