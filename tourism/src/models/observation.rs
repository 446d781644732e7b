use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// One day of demand data for a business. Unique per `(business_id, date)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, Validate)]
pub struct TimeSeriesObservation {
    #[validate(length(min = 1, max = 128))]
    pub business_id: String,
    pub date: NaiveDate,
    pub visitor_count: i64,
    #[serde(default)]
    pub revenue: Option<f64>,
    #[serde(default)]
    pub bookings: Option<i64>,
    #[serde(default)]
    pub cancellations: Option<i64>,
    #[serde(default)]
    pub occupancy_rate: Option<f64>,
    #[serde(default)]
    pub average_stay_duration: Option<f64>,
    #[serde(default)]
    pub source_market: Option<String>,
    #[serde(default)]
    pub weather_condition: Option<String>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub is_holiday: bool,
    #[serde(default)]
    pub is_weekend: bool,
    #[serde(default)]
    pub special_event: Option<String>,
    #[serde(default)]
    pub marketing_spend: Option<f64>,
}

impl TimeSeriesObservation {
    /// Bare observation with only the required fields set.
    pub fn new(business_id: impl Into<String>, date: NaiveDate, visitor_count: i64) -> Self {
        Self {
            business_id: business_id.into(),
            date,
            visitor_count,
            revenue: None,
            bookings: None,
            cancellations: None,
            occupancy_rate: None,
            average_stay_duration: None,
            source_market: None,
            weather_condition: None,
            temperature: None,
            is_holiday: false,
            is_weekend: false,
            special_event: None,
            marketing_spend: None,
        }
    }

    /// The covariates of this observation, as they would be supplied at predict time.
    pub fn to_partial(&self) -> PartialObservation {
        PartialObservation {
            business_id: self.business_id.clone(),
            date: self.date,
            source_market: self.source_market.clone(),
            weather_condition: self.weather_condition.clone(),
            temperature: self.temperature,
            is_holiday: Some(self.is_holiday),
            is_weekend: Some(self.is_weekend),
            special_event: self.special_event.clone(),
            marketing_spend: self.marketing_spend,
        }
    }
}

/// Predict input: a future (or hypothetical) day without a known visitor count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PartialObservation {
    pub business_id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub source_market: Option<String>,
    #[serde(default)]
    pub weather_condition: Option<String>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub is_holiday: Option<bool>,
    #[serde(default)]
    pub is_weekend: Option<bool>,
    #[serde(default)]
    pub special_event: Option<String>,
    #[serde(default)]
    pub marketing_spend: Option<f64>,
}

impl PartialObservation {
    pub fn new(business_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            business_id: business_id.into(),
            date,
            source_market: None,
            weather_condition: None,
            temperature: None,
            is_holiday: None,
            is_weekend: None,
            special_event: None,
            marketing_spend: None,
        }
    }
}

/// Covariates applied to every synthesized day of a future forecast.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BaseConditions {
    #[serde(default, alias = "average_temperature")]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub weather_condition: Option<String>,
    #[serde(default)]
    pub marketing_spend: Option<f64>,
    #[serde(default)]
    pub source_market: Option<String>,
    #[serde(default)]
    pub special_event: Option<String>,
}

/// Outcome of a bulk observation import. Failed rows do not abort the batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BulkImportSummary {
    pub inserted: usize,
    pub failed: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}
