use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use tracing::{debug, info, warn};
use validator::Validate;

use super::{check_period, round_to};
use crate::db::StorageBackend;
use crate::error::{Result, TourismError};
use crate::forecasting::DemandForecaster;
use crate::models::{
    AccuracyDetail, AccuracyReport, BaseConditions, BulkImportSummary, ForecastPoint,
    PartialObservation, TimeSeriesObservation, TrainingReport,
};

/// Longest horizon accepted by [`ForecastingService::generate_forecast`].
pub const MAX_FORECAST_DAYS: u32 = 365;
/// Window used by [`ForecastingService::historical_forecasts`] when no bounds are given.
const DEFAULT_HISTORY_DAYS: i64 = 365;

/// Storage-backed orchestration around the [`DemandForecaster`].
#[derive(Clone)]
pub struct ForecastingService {
    store: Arc<dyn StorageBackend>,
    forecaster: Arc<DemandForecaster>,
}

impl ForecastingService {
    pub fn new(store: Arc<dyn StorageBackend>, forecaster: Arc<DemandForecaster>) -> Self {
        Self { store, forecaster }
    }

    pub fn forecaster(&self) -> &Arc<DemandForecaster> {
        &self.forecaster
    }

    /// Trains on the stored observations inside the configured window, optionally
    /// restricted to one business.
    pub async fn train_models(&self, business_id: Option<&str>) -> Result<TrainingReport> {
        let window = self.forecaster.config().training_window_days;
        let since = Duration::try_days(window)
            .and_then(|span| Utc::now().date_naive().checked_sub_signed(span))
            .unwrap_or(NaiveDate::MIN);
        let observations = self.store.scan_observations(Some(since), business_id).await?;

        if observations.is_empty() {
            return Err(TourismError::Validation(
                "No historical data available for training".to_string(),
            ));
        }

        info!(
            business_id = business_id.unwrap_or("*"),
            observations = observations.len(),
            %since,
            "Training forecasting models from stored observations"
        );
        self.forecaster.train(observations).await
    }

    /// Forecasts `days` days from tomorrow and records the points.
    pub async fn generate_forecast(
        &self,
        business_id: &str,
        days: u32,
        base: BaseConditions,
    ) -> Result<Vec<ForecastPoint>> {
        if business_id.trim().is_empty() {
            return Err(TourismError::Validation("business_id is required".to_string()));
        }
        if days == 0 || days > MAX_FORECAST_DAYS {
            return Err(TourismError::Validation(format!(
                "days must be between 1 and {MAX_FORECAST_DAYS}"
            )));
        }

        let forecaster = self.forecaster.clone();
        let business = business_id.to_string();
        let points = tokio::task::spawn_blocking(move || {
            forecaster.forecast_future(&business, days, &base)
        })
        .await
        .map_err(|e| TourismError::Internal(format!("forecast task failed: {e}")))??;

        self.store.append_forecasts(&points).await?;
        debug!(business_id, points = points.len(), "Stored forecast");
        Ok(points)
    }

    /// Predicts the given rows off the async runtime. `model` defaults to the configured model.
    pub async fn predict(
        &self,
        inputs: Vec<PartialObservation>,
        model: Option<String>,
    ) -> Result<Vec<ForecastPoint>> {
        let forecaster = self.forecaster.clone();
        let model = model.unwrap_or_else(|| forecaster.config().default_model.clone());
        tokio::task::spawn_blocking(move || forecaster.predict(&inputs, &model))
            .await
            .map_err(|e| TourismError::Internal(format!("prediction task failed: {e}")))?
    }

    /// Compares stored forecasts against actual visitors over the last `days_back` days.
    pub async fn forecast_accuracy(&self, business_id: &str, days_back: i64) -> Result<AccuracyReport> {
        check_period("days_back", days_back)?;
        let end = Utc::now().date_naive();
        let start = end - Duration::days(days_back);

        let actual = self.store.query_observations(business_id, start, end).await?;
        let forecast = self.store.query_forecasts(business_id, start, end).await?;
        Ok(accuracy(&actual, &forecast))
    }

    pub async fn historical_forecasts(
        &self,
        business_id: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<ForecastPoint>> {
        let today = Utc::now().date_naive();
        let start = start.unwrap_or(today - Duration::days(DEFAULT_HISTORY_DAYS));
        let end = end.unwrap_or(today + Duration::days(i64::from(MAX_FORECAST_DAYS)));
        self.store.query_forecasts(business_id, start, end).await
    }

    pub async fn add_observation(&self, observation: TimeSeriesObservation) -> Result<TimeSeriesObservation> {
        validate_observation(&observation)?;
        self.store.append_observation(&observation).await?;
        Ok(observation)
    }

    /// Appends each observation independently. Rejected rows are counted, not fatal.
    pub async fn bulk_add_observations(
        &self,
        observations: Vec<TimeSeriesObservation>,
    ) -> Result<BulkImportSummary> {
        let mut summary = BulkImportSummary::default();

        for observation in observations {
            let outcome = match validate_observation(&observation) {
                Ok(()) => self.store.append_observation(&observation).await,
                Err(e) => Err(e),
            };
            match outcome {
                Ok(()) => summary.inserted += 1,
                Err(e) => {
                    warn!(
                        business_id = %observation.business_id,
                        date = %observation.date,
                        error = %e,
                        "Skipping observation"
                    );
                    summary.failed += 1;
                    summary
                        .errors
                        .push(format!("{} {}: {e}", observation.business_id, observation.date));
                }
            }
        }

        info!(
            inserted = summary.inserted,
            failed = summary.failed,
            "Bulk observation import complete"
        );
        Ok(summary)
    }

    pub async fn observations(
        &self,
        business_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TimeSeriesObservation>> {
        if start > end {
            return Err(TourismError::Validation(format!(
                "start date {start} is after end date {end}"
            )));
        }
        self.store.query_observations(business_id, start, end).await
    }
}

fn validate_observation(observation: &TimeSeriesObservation) -> Result<()> {
    observation.validate()?;
    if observation.visitor_count < 0 {
        return Err(TourismError::Validation(
            "visitor_count must not be negative".to_string(),
        ));
    }
    Ok(())
}

/// MAE, MAPE and RMSE of `forecast` against `actual` on the dates both cover.
///
/// Percentage errors divide by `max(actual, 1)`. Metrics are rounded to two
/// decimals and absent when no date overlaps.
pub fn accuracy(actual: &[TimeSeriesObservation], forecast: &[ForecastPoint]) -> AccuracyReport {
    let predicted: HashMap<NaiveDate, i64> = forecast
        .iter()
        .map(|p| (p.date, p.predicted_visitors))
        .collect();

    let mut details: Vec<AccuracyDetail> = actual
        .iter()
        .filter_map(|obs| {
            let predicted = *predicted.get(&obs.date)?;
            let error = (obs.visitor_count - predicted).abs();
            Some(AccuracyDetail {
                date: obs.date,
                actual: obs.visitor_count,
                predicted,
                error,
                percentage_error: error as f64 / obs.visitor_count.max(1) as f64 * 100.0,
            })
        })
        .collect();
    details.sort_by_key(|d| d.date);

    if details.is_empty() {
        return AccuracyReport {
            data_points: 0,
            mae: None,
            mape: None,
            rmse: None,
            details,
        };
    }

    let n = details.len() as f64;
    let mae = details.iter().map(|d| d.error as f64).sum::<f64>() / n;
    let mape = details.iter().map(|d| d.percentage_error).sum::<f64>() / n;
    let mse = details.iter().map(|d| (d.error as f64).powi(2)).sum::<f64>() / n;

    for detail in &mut details {
        detail.percentage_error = round_to(detail.percentage_error, 2);
    }

    AccuracyReport {
        data_points: details.len(),
        mae: Some(round_to(mae, 2)),
        mape: Some(round_to(mape, 2)),
        rmse: Some(round_to(mse.sqrt(), 2)),
        details,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ForecastingConfig;
    use crate::db::{InMemoryBackend, ModelStore};

    fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap() + Duration::days(offset)
    }

    fn point(date: NaiveDate, predicted: i64) -> ForecastPoint {
        ForecastPoint {
            date,
            business_id: "hotel-1".to_string(),
            predicted_visitors: predicted,
            confidence_lower: predicted,
            confidence_upper: predicted,
            model_used: "random_forest".to_string(),
        }
    }

    fn service() -> (ForecastingService, Arc<InMemoryBackend>) {
        let backend = Arc::new(InMemoryBackend::new());
        let config = ForecastingConfig {
            n_trees: 10,
            boosting_stages: 20,
            ..Default::default()
        };
        let forecaster = Arc::new(DemandForecaster::new(backend.clone(), config));
        (ForecastingService::new(backend.clone(), forecaster), backend)
    }

    #[test]
    fn test_accuracy_metrics() {
        let actual = vec![
            TimeSeriesObservation::new("hotel-1", day(0), 100),
            TimeSeriesObservation::new("hotel-1", day(1), 110),
            TimeSeriesObservation::new("hotel-1", day(2), 90),
        ];
        let forecast = vec![point(day(0), 105), point(day(1), 100), point(day(2), 95)];

        let report = accuracy(&actual, &forecast);
        assert_eq!(report.data_points, 3);
        assert_eq!(report.mae, Some(6.67));
        assert_eq!(report.mape, Some(6.55));
        assert_eq!(report.rmse, Some(7.07));
        assert_eq!(report.details[1].error, 10);
    }

    #[test]
    fn test_accuracy_skips_unmatched_dates() {
        let actual = vec![
            TimeSeriesObservation::new("hotel-1", day(0), 0),
            TimeSeriesObservation::new("hotel-1", day(5), 50),
        ];
        let forecast = vec![point(day(0), 3), point(day(9), 70)];

        let report = accuracy(&actual, &forecast);
        assert_eq!(report.data_points, 1);
        // zero actual divides by one
        assert_eq!(report.details[0].percentage_error, 300.0);
    }

    #[test]
    fn test_accuracy_without_overlap() {
        let report = accuracy(
            &[TimeSeriesObservation::new("hotel-1", day(0), 10)],
            &[point(day(1), 10)],
        );
        assert_eq!(report.data_points, 0);
        assert!(report.mae.is_none());
        assert!(report.mape.is_none());
        assert!(report.rmse.is_none());
    }

    #[tokio::test]
    async fn test_train_without_data_is_rejected() {
        let (service, _) = service();
        let err = service.train_models(None).await.unwrap_err();
        assert!(matches!(err, TourismError::Validation(_)));
    }

    #[tokio::test]
    async fn test_accuracy_rejects_out_of_range_window() {
        let (service, _) = service();
        for days_back in [0, 366, i64::MAX] {
            let err = service.forecast_accuracy("hotel-1", days_back).await.unwrap_err();
            assert!(
                matches!(&err, TourismError::Validation(msg) if msg.contains("days_back")),
                "{days_back}: {err:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_bulk_import_counts_failures() {
        let (service, _) = service();
        let rows = vec![
            TimeSeriesObservation::new("hotel-1", day(0), 10),
            TimeSeriesObservation::new("hotel-1", day(0), 12),
            TimeSeriesObservation::new("hotel-1", day(1), -4),
            TimeSeriesObservation::new("", day(2), 4),
            TimeSeriesObservation::new("hotel-1", day(3), 9),
        ];

        let summary = service.bulk_add_observations(rows).await.unwrap();
        assert_eq!(summary.inserted, 2);
        assert_eq!(summary.failed, 3);
        assert_eq!(summary.errors.len(), 3);

        let stored = service.observations("hotel-1", day(0), day(10)).await.unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].visitor_count, 10);
    }

    #[tokio::test]
    async fn test_observation_range_must_be_ordered() {
        let (service, _) = service();
        assert!(matches!(
            service.observations("hotel-1", day(3), day(1)).await,
            Err(TourismError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_generate_forecast_requires_training() {
        let (service, _) = service();
        let err = service
            .generate_forecast("hotel-1", 7, BaseConditions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TourismError::NotTrained(_)));

        let err = service
            .generate_forecast("hotel-1", 0, BaseConditions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TourismError::Validation(_)));
    }

    #[tokio::test]
    async fn test_train_forecast_and_measure() {
        let (service, backend) = service();
        let today = Utc::now().date_naive();
        for i in 0..60 {
            let date = today - Duration::days(60 - i);
            let mut obs = TimeSeriesObservation::new("hotel-1", date, 100 + (i % 7) * 5);
            obs.temperature = Some(18.0);
            service.add_observation(obs).await.unwrap();
        }

        let report = service.train_models(Some("hotel-1")).await.unwrap();
        assert_eq!(report.training_samples + report.test_samples, 60);
        assert!(report.persisted);
        assert!(backend.load_bundle("demand_forecaster").await.unwrap().is_some());

        let points = service
            .generate_forecast("hotel-1", 5, BaseConditions::default())
            .await
            .unwrap();
        assert_eq!(points.len(), 5);
        assert_eq!(points[0].date, today + Duration::days(1));

        let stored = service.historical_forecasts("hotel-1", None, None).await.unwrap();
        assert_eq!(stored, points);

        let rows = vec![PartialObservation::new("hotel-1", today + Duration::days(1))];
        let linear = service
            .predict(rows.clone(), Some("linear_regression".to_string()))
            .await
            .unwrap();
        assert_eq!(linear[0].model_used, "linear_regression");
        let default = service.predict(rows, None).await.unwrap();
        assert_eq!(default[0].model_used, "random_forest");

        // forecasts lie in the future, so nothing overlaps yet
        let report = service.forecast_accuracy("hotel-1", 30).await.unwrap();
        assert_eq!(report.data_points, 0);
    }
}
