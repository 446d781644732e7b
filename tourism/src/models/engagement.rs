use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::Intent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

impl std::fmt::Display for ChatRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

impl std::str::FromStr for ChatRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            _ => Err(format!("Unknown chat role: {s}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChatMessageRecord {
    pub id: String,
    pub business_id: String,
    pub session_id: String,
    pub role: ChatRole,
    pub text: String,
    pub intent: Option<Intent>,
    pub confidence: Option<f64>,
    pub language: Option<String>,
    pub response_time_ms: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl ChatMessageRecord {
    /// Unclassified record. Intent fields are filled in for user messages.
    pub fn new(id: String, new: NewChatMessage) -> Self {
        Self {
            id,
            business_id: new.business_id,
            session_id: new.session_id,
            role: new.role,
            text: new.text,
            intent: None,
            confidence: None,
            language: new.language,
            response_time_ms: new.response_time_ms,
            created_at: new.created_at.unwrap_or_else(Utc::now),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct NewChatMessage {
    #[validate(length(min = 1, max = 128))]
    pub business_id: String,
    #[validate(length(min = 1, max = 128))]
    pub session_id: String,
    pub role: ChatRole,
    #[validate(length(min = 1, max = 10000))]
    pub text: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub response_time_ms: Option<i64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    #[default]
    New,
    Contacted,
    Qualified,
    Converted,
    Lost,
}

impl std::fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::New => write!(f, "new"),
            Self::Contacted => write!(f, "contacted"),
            Self::Qualified => write!(f, "qualified"),
            Self::Converted => write!(f, "converted"),
            Self::Lost => write!(f, "lost"),
        }
    }
}

impl std::str::FromStr for LeadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "new" => Ok(Self::New),
            "contacted" => Ok(Self::Contacted),
            "qualified" => Ok(Self::Qualified),
            "converted" => Ok(Self::Converted),
            "lost" => Ok(Self::Lost),
            _ => Err(format!("Unknown lead status: {s}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LeadRecord {
    pub id: String,
    pub business_id: String,
    pub status: LeadStatus,
    pub source: Option<String>,
    pub score: Option<f64>,
    pub converted: bool,
    pub conversion_value: Option<f64>,
    pub converted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl LeadRecord {
    pub fn new(id: String, new: NewLead) -> Self {
        let converted = new.converted || new.status == LeadStatus::Converted;
        let created_at = new.created_at.unwrap_or_else(Utc::now);
        Self {
            id,
            business_id: new.business_id,
            status: if converted { LeadStatus::Converted } else { new.status },
            source: new.source,
            score: new.score,
            converted,
            conversion_value: new.conversion_value,
            converted_at: if converted {
                Some(new.converted_at.unwrap_or(created_at))
            } else {
                None
            },
            created_at,
        }
    }

    /// Marks the lead converted now. A repeat conversion keeps the original
    /// conversion time and only replaces the value when one is given.
    pub fn convert(&mut self, conversion_value: Option<f64>, at: DateTime<Utc>) {
        if !self.converted {
            self.converted = true;
            self.converted_at = Some(at);
        }
        self.status = LeadStatus::Converted;
        if conversion_value.is_some() {
            self.conversion_value = conversion_value;
        }
    }

    /// Applies the fields present in `update`. Moving to `converted` records
    /// the conversion at `at`.
    pub fn apply(&mut self, update: LeadUpdate, at: DateTime<Utc>) {
        if let Some(score) = update.score {
            self.score = Some(score);
        }
        match update.status {
            Some(LeadStatus::Converted) => self.convert(update.conversion_value, at),
            Some(status) => {
                self.status = status;
                if let Some(value) = update.conversion_value {
                    self.conversion_value = Some(value);
                }
            }
            None => {
                if let Some(value) = update.conversion_value {
                    self.conversion_value = Some(value);
                }
            }
        }
    }

    /// When the conversion happened, falling back to creation time.
    pub fn conversion_time(&self) -> Option<DateTime<Utc>> {
        self.converted.then(|| self.converted_at.unwrap_or(self.created_at))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct NewLead {
    #[validate(length(min = 1, max = 128))]
    pub business_id: String,
    #[serde(default)]
    pub status: LeadStatus,
    #[serde(default)]
    pub source: Option<String>,
    #[validate(range(min = 0.0, max = 100.0))]
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub converted: bool,
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub conversion_value: Option<f64>,
    #[serde(default)]
    pub converted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Partial lead update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate)]
pub struct LeadUpdate {
    #[serde(default)]
    pub status: Option<LeadStatus>,
    #[validate(range(min = 0.0, max = 100.0))]
    #[serde(default)]
    pub score: Option<f64>,
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub conversion_value: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn lead() -> LeadRecord {
        LeadRecord::new(
            "l1".to_string(),
            NewLead {
                business_id: "hotel-1".to_string(),
                status: LeadStatus::Contacted,
                source: Some("chat".to_string()),
                score: Some(50.0),
                converted: false,
                conversion_value: None,
                converted_at: None,
                created_at: Some(Utc::now() - Duration::days(60)),
            },
        )
    }

    #[test]
    fn test_convert_records_time_once() {
        let mut lead = lead();
        let first = Utc::now() - Duration::hours(2);
        lead.convert(Some(300.0), first);
        assert!(lead.converted);
        assert_eq!(lead.status, LeadStatus::Converted);
        assert_eq!(lead.conversion_time(), Some(first));

        lead.convert(None, Utc::now());
        assert_eq!(lead.converted_at, Some(first));
        assert_eq!(lead.conversion_value, Some(300.0));
    }

    #[test]
    fn test_apply_partial_update() {
        let mut lead = lead();
        let now = Utc::now();
        lead.apply(
            LeadUpdate {
                status: Some(LeadStatus::Qualified),
                score: Some(75.0),
                conversion_value: None,
            },
            now,
        );
        assert_eq!(lead.status, LeadStatus::Qualified);
        assert_eq!(lead.score, Some(75.0));
        assert!(!lead.converted);

        lead.apply(
            LeadUpdate {
                status: Some(LeadStatus::Converted),
                ..Default::default()
            },
            now,
        );
        assert!(lead.converted);
        assert_eq!(lead.converted_at, Some(now));
        assert_eq!(lead.score, Some(75.0));
    }
}
