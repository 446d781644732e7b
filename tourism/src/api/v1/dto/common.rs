//! Query parameters shared by several v1 endpoints.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{Result, TourismError};

pub const DEFAULT_PERIOD_DAYS: i64 = 30;

fn default_period_days() -> i64 {
    DEFAULT_PERIOD_DAYS
}

/// Reporting window for dashboards and statistics.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema, utoipa::IntoParams)]
pub struct PeriodQuery {
    /// Number of days back from now (default 30, max 365).
    #[serde(default = "default_period_days")]
    pub days: i64,
}

impl Default for PeriodQuery {
    fn default() -> Self {
        Self {
            days: DEFAULT_PERIOD_DAYS,
        }
    }
}

/// Optional inclusive date range. Omitted bounds fall back per endpoint.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema, utoipa::IntoParams)]
pub struct DateRangeQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// Rejects batches that are empty or larger than `max`.
pub fn check_batch_size(len: usize, max: usize, what: &str) -> Result<()> {
    if len == 0 {
        return Err(TourismError::Validation(format!("{what} must not be empty")));
    }
    if len > max {
        return Err(TourismError::Validation(format!(
            "{what} exceeds the maximum of {max} items"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_query_default() {
        let query: PeriodQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.days, 30);
    }

    #[test]
    fn test_check_batch_size() {
        assert!(check_batch_size(1, 10, "texts").is_ok());
        assert!(matches!(
            check_batch_size(0, 10, "texts"),
            Err(TourismError::Validation(_))
        ));
        assert!(matches!(
            check_batch_size(11, 10, "texts"),
            Err(TourismError::Validation(_))
        ));
    }
}
