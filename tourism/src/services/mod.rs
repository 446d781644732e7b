mod analytics;
mod forecasting;
mod retrain;
mod reviews;

pub use analytics::{
    chat_analytics, lead_analytics, sentiment_trend, AnalyticsService, DASHBOARD_CACHE_NAMESPACE,
    MAX_PERIOD_DAYS,
};
pub use forecasting::{accuracy, ForecastingService, MAX_FORECAST_DAYS};
pub use retrain::RetrainManager;
pub use reviews::{review_statistics, ReviewService, MAX_PROCESS_BATCH};

/// Rejects look-back periods outside `1..=MAX_PERIOD_DAYS`.
pub(crate) fn check_period(field: &str, days: i64) -> crate::error::Result<()> {
    if (1..=MAX_PERIOD_DAYS).contains(&days) {
        Ok(())
    } else {
        Err(crate::error::TourismError::Validation(format!(
            "{field} must be between 1 and {MAX_PERIOD_DAYS}"
        )))
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_period_bounds() {
        assert!(check_period("days", 1).is_ok());
        assert!(check_period("days", MAX_PERIOD_DAYS).is_ok());
        assert!(check_period("days", 0).is_err());
        assert!(check_period("days", MAX_PERIOD_DAYS + 1).is_err());
        assert!(check_period("days_back", i64::MAX).is_err());
        assert!(check_period("days_back", i64::MIN).is_err());
    }
}
