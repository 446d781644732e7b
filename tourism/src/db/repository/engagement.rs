use chrono::{DateTime, Utc};
use libsql::{params, Connection};

use super::{format_timestamp, parse_optional_timestamp, parse_timestamp};
use crate::error::{Result, TourismError};
use crate::models::{ChatMessageRecord, ChatRole, LeadRecord, LeadStatus};

pub struct ChatMessageRepository;

impl ChatMessageRepository {
    pub async fn create(conn: &Connection, message: &ChatMessageRecord) -> Result<()> {
        conn.execute(
            r#"
            INSERT INTO chat_messages (
                id, business_id, session_id, role, text, intent, confidence,
                language, response_time_ms, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                message.id.clone(),
                message.business_id.clone(),
                message.session_id.clone(),
                message.role.to_string(),
                message.text.clone(),
                message.intent.map(|i| i.to_string()),
                message.confidence,
                message.language.clone(),
                message.response_time_ms,
                format_timestamp(&message.created_at),
            ],
        )
        .await?;

        Ok(())
    }

    pub async fn list_since(
        conn: &Connection,
        business_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<ChatMessageRecord>> {
        let mut rows = conn
            .query(
                r#"
                SELECT id, business_id, session_id, role, text, intent, confidence,
                       language, response_time_ms, created_at
                FROM chat_messages
                WHERE business_id = ?1 AND created_at >= ?2
                ORDER BY created_at ASC
                "#,
                params![business_id, format_timestamp(&since)],
            )
            .await?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            let role: String = row.get(3)?;
            let intent: Option<String> = row.get(5)?;
            results.push(ChatMessageRecord {
                id: row.get(0)?,
                business_id: row.get(1)?,
                session_id: row.get(2)?,
                role: role.parse::<ChatRole>().map_err(TourismError::Internal)?,
                text: row.get(4)?,
                intent: intent.and_then(|i| i.parse().ok()),
                confidence: row.get(6)?,
                language: row.get(7)?,
                response_time_ms: row.get(8)?,
                created_at: parse_timestamp(&row.get::<String>(9)?),
            });
        }
        Ok(results)
    }
}

const LEAD_COLUMNS: &str = "SELECT id, business_id, status, source, score, converted, \
                            conversion_value, converted_at, created_at FROM leads";

pub struct LeadRepository;

impl LeadRepository {
    pub async fn create(conn: &Connection, lead: &LeadRecord) -> Result<()> {
        conn.execute(
            r#"
            INSERT INTO leads (
                id, business_id, status, source, score, converted,
                conversion_value, converted_at, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                lead.id.clone(),
                lead.business_id.clone(),
                lead.status.to_string(),
                lead.source.clone(),
                lead.score,
                lead.converted as i64,
                lead.conversion_value,
                lead.converted_at.as_ref().map(format_timestamp),
                format_timestamp(&lead.created_at),
            ],
        )
        .await?;

        Ok(())
    }

    pub async fn get_by_id(conn: &Connection, id: &str) -> Result<Option<LeadRecord>> {
        let sql = format!("{LEAD_COLUMNS} WHERE id = ?1");
        let mut rows = conn.query(&sql, params![id]).await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::row_to_lead(&row)?)),
            None => Ok(None),
        }
    }

    /// Writes the funnel fields. Business, source and creation time are immutable.
    pub async fn update(conn: &Connection, lead: &LeadRecord) -> Result<()> {
        let updated = conn
            .execute(
                r#"
                UPDATE leads SET
                    status = ?2,
                    score = ?3,
                    converted = ?4,
                    conversion_value = ?5,
                    converted_at = ?6
                WHERE id = ?1
                "#,
                params![
                    lead.id.clone(),
                    lead.status.to_string(),
                    lead.score,
                    lead.converted as i64,
                    lead.conversion_value,
                    lead.converted_at.as_ref().map(format_timestamp),
                ],
            )
            .await?;

        if updated == 0 {
            return Err(TourismError::NotFound(format!("Lead {}", lead.id)));
        }
        Ok(())
    }

    pub async fn list_since(
        conn: &Connection,
        business_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<LeadRecord>> {
        let sql = format!(
            "{LEAD_COLUMNS} WHERE business_id = ?1 AND (created_at >= ?2 OR converted_at >= ?2) \
             ORDER BY created_at ASC"
        );
        let mut rows = conn
            .query(&sql, params![business_id, format_timestamp(&since)])
            .await?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            results.push(Self::row_to_lead(&row)?);
        }
        Ok(results)
    }

    fn row_to_lead(row: &libsql::Row) -> Result<LeadRecord> {
        let status: String = row.get(2)?;
        Ok(LeadRecord {
            id: row.get(0)?,
            business_id: row.get(1)?,
            status: status.parse::<LeadStatus>().unwrap_or_default(),
            source: row.get(3)?,
            score: row.get(4)?,
            converted: row.get::<i64>(5)? != 0,
            conversion_value: row.get(6)?,
            converted_at: parse_optional_timestamp(row.get(7)?),
            created_at: parse_timestamp(&row.get::<String>(8)?),
        })
    }
}
