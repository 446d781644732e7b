use chrono::Utc;
use libsql::{params, Connection};

use super::format_timestamp;
use crate::error::Result;

pub struct BundleRepository;

impl BundleRepository {
    /// Single-statement upsert, so readers never observe a partial bundle.
    pub async fn save(conn: &Connection, bundle_id: &str, blob: &[u8]) -> Result<()> {
        conn.execute(
            r#"
            INSERT INTO model_bundles (id, blob, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET blob = excluded.blob, updated_at = excluded.updated_at
            "#,
            params![bundle_id, blob.to_vec(), format_timestamp(&Utc::now())],
        )
        .await?;

        Ok(())
    }

    pub async fn load(conn: &Connection, bundle_id: &str) -> Result<Option<Vec<u8>>> {
        let mut rows = conn
            .query(
                "SELECT blob FROM model_bundles WHERE id = ?1",
                params![bundle_id],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(row.get::<Vec<u8>>(0)?)),
            None => Ok(None),
        }
    }
}
