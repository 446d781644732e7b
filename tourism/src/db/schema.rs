use libsql::Connection;

use crate::error::Result;

pub async fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Daily demand observations
        CREATE TABLE IF NOT EXISTS observations (
            business_id TEXT NOT NULL,
            date TEXT NOT NULL,
            visitor_count INTEGER NOT NULL,
            revenue REAL,
            bookings INTEGER,
            cancellations INTEGER,
            occupancy_rate REAL,
            average_stay_duration REAL,
            source_market TEXT,
            weather_condition TEXT,
            temperature REAL,
            is_holiday INTEGER NOT NULL DEFAULT 0,
            is_weekend INTEGER NOT NULL DEFAULT 0,
            special_event TEXT,
            marketing_spend REAL,
            created_at TEXT NOT NULL,
            PRIMARY KEY (business_id, date)
        );

        CREATE INDEX IF NOT EXISTS idx_observations_date ON observations(date);

        -- Forecast points, append-only; the highest id per date is current
        CREATE TABLE IF NOT EXISTS forecasts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            business_id TEXT NOT NULL,
            date TEXT NOT NULL,
            predicted_visitors INTEGER NOT NULL,
            confidence_lower INTEGER NOT NULL,
            confidence_upper INTEGER NOT NULL,
            model_used TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_forecasts_business_date ON forecasts(business_id, date);

        -- Reviews and their sentiment once processed
        CREATE TABLE IF NOT EXISTS reviews (
            id TEXT PRIMARY KEY,
            business_id TEXT NOT NULL,
            text TEXT NOT NULL,
            rating INTEGER,
            source TEXT,
            processed INTEGER NOT NULL DEFAULT 0,
            sentiment_score REAL,
            sentiment_label TEXT,
            confidence REAL,
            emotions TEXT DEFAULT '{}',
            keywords TEXT DEFAULT '[]',
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_reviews_business_created ON reviews(business_id, created_at);
        CREATE INDEX IF NOT EXISTS idx_reviews_processed ON reviews(processed);

        -- Chat transcript messages
        CREATE TABLE IF NOT EXISTS chat_messages (
            id TEXT PRIMARY KEY,
            business_id TEXT NOT NULL,
            session_id TEXT NOT NULL,
            role TEXT NOT NULL,
            text TEXT NOT NULL,
            intent TEXT,
            confidence REAL,
            language TEXT,
            response_time_ms INTEGER,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_chat_messages_business_created ON chat_messages(business_id, created_at);

        -- Sales leads
        CREATE TABLE IF NOT EXISTS leads (
            id TEXT PRIMARY KEY,
            business_id TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'new',
            source TEXT,
            score REAL,
            converted INTEGER NOT NULL DEFAULT 0,
            conversion_value REAL,
            converted_at TEXT,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_leads_business_created ON leads(business_id, created_at);

        -- Serialized forecasting model bundles
        CREATE TABLE IF NOT EXISTS model_bundles (
            id TEXT PRIMARY KEY,
            blob BLOB NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_schema_is_idempotent() {
        let conn = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .unwrap()
            .connect()
            .unwrap();

        init_schema(&conn).await.unwrap();
        init_schema(&conn).await.unwrap();

        let mut rows = conn
            .query(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
                (),
            )
            .await
            .unwrap();
        let mut tables = Vec::new();
        while let Some(row) = rows.next().await.unwrap() {
            tables.push(row.get::<String>(0).unwrap());
        }
        assert_eq!(
            tables,
            vec!["chat_messages", "forecasts", "leads", "model_bundles", "observations", "reviews"]
        );
    }
}
