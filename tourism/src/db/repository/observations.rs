use chrono::{NaiveDate, Utc};
use libsql::{params, Connection};

use super::{format_timestamp, parse_date, DATE_FORMAT};
use crate::error::{Result, TourismError};
use crate::models::TimeSeriesObservation;

const SELECT_COLUMNS: &str = r#"
    SELECT business_id, date, visitor_count, revenue, bookings, cancellations,
           occupancy_rate, average_stay_duration, source_market, weather_condition,
           temperature, is_holiday, is_weekend, special_event, marketing_spend
    FROM observations
"#;

pub struct ObservationRepository;

impl ObservationRepository {
    pub async fn append(conn: &Connection, obs: &TimeSeriesObservation) -> Result<()> {
        let inserted = conn
            .execute(
                r#"
                INSERT INTO observations (
                    business_id, date, visitor_count, revenue, bookings, cancellations,
                    occupancy_rate, average_stay_duration, source_market, weather_condition,
                    temperature, is_holiday, is_weekend, special_event, marketing_spend, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
                ON CONFLICT(business_id, date) DO NOTHING
                "#,
                params![
                    obs.business_id.clone(),
                    obs.date.format(DATE_FORMAT).to_string(),
                    obs.visitor_count,
                    obs.revenue,
                    obs.bookings,
                    obs.cancellations,
                    obs.occupancy_rate,
                    obs.average_stay_duration,
                    obs.source_market.clone(),
                    obs.weather_condition.clone(),
                    obs.temperature,
                    obs.is_holiday as i64,
                    obs.is_weekend as i64,
                    obs.special_event.clone(),
                    obs.marketing_spend,
                    format_timestamp(&Utc::now()),
                ],
            )
            .await?;

        if inserted == 0 {
            return Err(TourismError::Validation(format!(
                "Observation for business '{}' on {} already exists",
                obs.business_id, obs.date
            )));
        }
        Ok(())
    }

    pub async fn query_range(
        conn: &Connection,
        business_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TimeSeriesObservation>> {
        let sql = format!(
            "{SELECT_COLUMNS} WHERE business_id = ?1 AND date >= ?2 AND date <= ?3 ORDER BY date ASC"
        );
        let mut rows = conn
            .query(
                &sql,
                params![
                    business_id,
                    start.format(DATE_FORMAT).to_string(),
                    end.format(DATE_FORMAT).to_string(),
                ],
            )
            .await?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            results.push(Self::row_to_observation(&row)?);
        }
        Ok(results)
    }

    pub async fn scan(
        conn: &Connection,
        since: Option<NaiveDate>,
        business_id: Option<&str>,
    ) -> Result<Vec<TimeSeriesObservation>> {
        let sql = format!(
            "{SELECT_COLUMNS} WHERE (?1 IS NULL OR date >= ?1) AND (?2 IS NULL OR business_id = ?2) \
             ORDER BY date ASC, business_id ASC"
        );
        let mut rows = conn
            .query(
                &sql,
                params![
                    since.map(|d| d.format(DATE_FORMAT).to_string()),
                    business_id.map(str::to_string),
                ],
            )
            .await?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            results.push(Self::row_to_observation(&row)?);
        }
        Ok(results)
    }

    fn row_to_observation(row: &libsql::Row) -> Result<TimeSeriesObservation> {
        Ok(TimeSeriesObservation {
            business_id: row.get(0)?,
            date: parse_date(&row.get::<String>(1)?)?,
            visitor_count: row.get(2)?,
            revenue: row.get(3)?,
            bookings: row.get(4)?,
            cancellations: row.get(5)?,
            occupancy_rate: row.get(6)?,
            average_stay_duration: row.get(7)?,
            source_market: row.get(8)?,
            weather_condition: row.get(9)?,
            temperature: row.get(10)?,
            is_holiday: row.get::<i64>(11)? != 0,
            is_weekend: row.get::<i64>(12)? != 0,
            special_event: row.get(13)?,
            marketing_spend: row.get(14)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::setup_test_db;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[tokio::test]
    async fn test_append_and_query_range() {
        let conn = setup_test_db().await;

        let mut first = TimeSeriesObservation::new("hotel-1", date(2), 120);
        first.revenue = Some(5400.5);
        first.weather_condition = Some("sunny".to_string());
        first.is_weekend = true;
        ObservationRepository::append(&conn, &first).await.unwrap();
        ObservationRepository::append(&conn, &TimeSeriesObservation::new("hotel-1", date(1), 90))
            .await
            .unwrap();
        ObservationRepository::append(&conn, &TimeSeriesObservation::new("hotel-2", date(1), 10))
            .await
            .unwrap();

        let rows = ObservationRepository::query_range(&conn, "hotel-1", date(1), date(30))
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, date(1));
        assert_eq!(rows[1], first);
    }

    #[tokio::test]
    async fn test_duplicate_key_is_rejected() {
        let conn = setup_test_db().await;
        let obs = TimeSeriesObservation::new("hotel-1", date(5), 100);
        ObservationRepository::append(&conn, &obs).await.unwrap();

        let err = ObservationRepository::append(&conn, &obs).await.unwrap_err();
        assert!(matches!(err, TourismError::Validation(_)));
    }

    #[tokio::test]
    async fn test_scan_filters() {
        let conn = setup_test_db().await;
        for (business, day) in [("a", 3), ("b", 1), ("a", 1), ("b", 4)] {
            ObservationRepository::append(&conn, &TimeSeriesObservation::new(business, date(day), 1))
                .await
                .unwrap();
        }

        let all = ObservationRepository::scan(&conn, None, None).await.unwrap();
        let keys: Vec<(String, NaiveDate)> =
            all.iter().map(|o| (o.business_id.clone(), o.date)).collect();
        assert_eq!(
            keys,
            vec![
                ("a".to_string(), date(1)),
                ("b".to_string(), date(1)),
                ("a".to_string(), date(3)),
                ("b".to_string(), date(4)),
            ]
        );

        let recent = ObservationRepository::scan(&conn, Some(date(3)), None).await.unwrap();
        assert_eq!(recent.len(), 2);
        let only_b = ObservationRepository::scan(&conn, None, Some("b")).await.unwrap();
        assert_eq!(only_b.len(), 2);
    }
}
