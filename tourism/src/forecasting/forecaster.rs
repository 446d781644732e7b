use chrono::{Duration, NaiveDate, Utc};
use std::sync::{Arc, RwLock};
use tracing::{error, info, warn};

use super::bundle::TrainedModelSet;
use super::calendar::future_rows;
use super::features::feature_row;
use super::regressors::{Estimator, ModelKind, TrainingParams};
use super::training::fit_bundle;
use crate::config::ForecastingConfig;
use crate::db::ModelStore;
use crate::error::{Result, TourismError};
use crate::models::{
    BaseConditions, FeatureImportance, ForecastPoint, ForecasterStatus, ModelPerformance,
    PartialObservation, TimeSeriesObservation, TrainingReport,
};

/// z-score of a two-sided 95% interval.
const Z_95: f64 = 1.96;
const TOP_FEATURES: usize = 15;

/// Trains, persists and serves the visitor-demand models.
///
/// Starts untrained. A successful [`train`](Self::train) or [`load`](Self::load)
/// installs a bundle; later trainings replace it in one swap, so concurrent
/// predictions see either the old or the new bundle, never a mix.
pub struct DemandForecaster {
    bundle: RwLock<Option<Arc<TrainedModelSet>>>,
    /// Serializes install and save, so the persisted bundle is the installed one.
    publish: tokio::sync::Mutex<()>,
    store: Arc<dyn ModelStore>,
    config: ForecastingConfig,
}

impl DemandForecaster {
    pub fn new(store: Arc<dyn ModelStore>, config: ForecastingConfig) -> Self {
        Self {
            bundle: RwLock::new(None),
            publish: tokio::sync::Mutex::new(()),
            store,
            config,
        }
    }

    pub fn config(&self) -> &ForecastingConfig {
        &self.config
    }

    fn params(&self) -> TrainingParams {
        TrainingParams {
            n_trees: self.config.n_trees,
            boosting_stages: self.config.boosting_stages,
            ..Default::default()
        }
    }

    fn snapshot(&self) -> Result<Option<Arc<TrainedModelSet>>> {
        let guard = self
            .bundle
            .read()
            .map_err(|_| TourismError::Internal("model bundle lock poisoned".to_string()))?;
        Ok(guard.clone())
    }

    fn install(&self, bundle: Arc<TrainedModelSet>) -> Result<()> {
        let mut guard = self
            .bundle
            .write()
            .map_err(|_| TourismError::Internal("model bundle lock poisoned".to_string()))?;
        *guard = Some(bundle);
        Ok(())
    }

    /// The installed bundle, or `NotTrained`.
    pub fn current(&self) -> Result<Arc<TrainedModelSet>> {
        self.snapshot()?.ok_or_else(TourismError::not_trained)
    }

    pub fn is_trained(&self) -> bool {
        matches!(self.snapshot(), Ok(Some(_)))
    }

    /// Loads the persisted bundle. Returns whether one was installed.
    ///
    /// A missing, undecodable or incomplete bundle leaves the forecaster untrained.
    pub async fn load(&self) -> Result<bool> {
        let Some(blob) = self.store.load_bundle(&self.config.bundle_id).await? else {
            info!(bundle_id = %self.config.bundle_id, "No persisted model bundle found");
            return Ok(false);
        };

        match TrainedModelSet::from_blob(&blob) {
            Ok(bundle) => {
                info!(
                    bundle_id = %bundle.bundle_id,
                    trained_at = %bundle.trained_at,
                    models = bundle.models.len(),
                    "Loaded model bundle"
                );
                self.install(Arc::new(bundle))?;
                Ok(true)
            }
            Err(e) => {
                warn!(bundle_id = %self.config.bundle_id, error = %e, "Ignoring unusable model bundle");
                Ok(false)
            }
        }
    }

    /// Fits every model kind off the async runtime, installs the new bundle,
    /// then persists it. A failed save is reported, not returned.
    pub async fn train(&self, observations: Vec<TimeSeriesObservation>) -> Result<TrainingReport> {
        let bundle_id = self.config.bundle_id.clone();
        let params = self.params();
        let received = observations.len();
        info!(observations = received, "Training demand forecaster");

        let (bundle, mut report) =
            tokio::task::spawn_blocking(move || fit_bundle(&bundle_id, observations, &params))
                .await
                .map_err(|e| TourismError::Internal(format!("training task failed: {e}")))??;

        let bundle = Arc::new(bundle);
        let publishing = self.publish.lock().await;
        self.install(bundle.clone())?;

        let saved = match bundle.to_blob() {
            Ok(blob) => self.store.save_bundle(&bundle.bundle_id, &blob).await,
            Err(e) => Err(e),
        };
        drop(publishing);
        match saved {
            Ok(()) => report.persisted = true,
            Err(e) => {
                error!(bundle_id = %bundle.bundle_id, error = %e, "Failed to persist model bundle");
                report.warning = Some(format!(
                    "Model trained but could not be persisted and will be lost on restart: {e}"
                ));
            }
        }

        info!(
            best_model = %report.best_model,
            training_samples = report.training_samples,
            persisted = report.persisted,
            "Demand forecaster trained"
        );
        Ok(report)
    }

    /// Predicts daily visitors for each input row with the named model.
    pub fn predict(
        &self,
        inputs: &[PartialObservation],
        model_name: &str,
    ) -> Result<Vec<ForecastPoint>> {
        let bundle = self.current()?;
        let (kind, model) = bundle.model(model_name)?;
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let rmse = bundle
            .performance
            .get(kind.as_str())
            .map_or(0.0, |m| m.rmse);

        inputs
            .iter()
            .map(|input| {
                let raw = feature_row(input, &bundle.encoders, &bundle.history);
                let row = bundle.scaler.transform_row(&raw);
                let predicted = model.predict_row(&row);
                if !predicted.is_finite() {
                    return Err(TourismError::Forecasting(format!(
                        "{kind} produced a non-finite prediction for {}",
                        input.date
                    )));
                }

                let spread = match model.member_predictions(&row) {
                    Some(members) => population_std(&members),
                    None => rmse,
                };
                let delta = if spread.is_finite() { Z_95 * spread } else { 0.0 };

                Ok(ForecastPoint {
                    date: input.date,
                    business_id: input.business_id.clone(),
                    predicted_visitors: clip_round(predicted),
                    confidence_lower: clip_round(predicted - delta),
                    confidence_upper: clip_round(predicted + delta),
                    model_used: kind.as_str().to_string(),
                })
            })
            .collect()
    }

    /// Forecasts `days_ahead` days starting tomorrow (UTC) with the default model.
    pub fn forecast_future(
        &self,
        business_id: &str,
        days_ahead: u32,
        base: &BaseConditions,
    ) -> Result<Vec<ForecastPoint>> {
        let tomorrow = Utc::now().date_naive() + Duration::days(1);
        self.forecast_from(business_id, tomorrow, days_ahead, base)
    }

    pub fn forecast_from(
        &self,
        business_id: &str,
        start: NaiveDate,
        days_ahead: u32,
        base: &BaseConditions,
    ) -> Result<Vec<ForecastPoint>> {
        let rows = future_rows(business_id, start, days_ahead, base);
        self.predict(&rows, &self.config.default_model)
    }

    /// Top features by impurity decrease for a tree-based model.
    pub fn feature_importance(&self, model_name: &str) -> Result<Vec<FeatureImportance>> {
        let bundle = self.current()?;
        let (kind, model) = bundle.model(model_name)?;
        let importances = model.feature_importances().ok_or_else(|| {
            TourismError::Unsupported(format!("{kind} does not provide feature importances"))
        })?;

        let mut ranked: Vec<FeatureImportance> = bundle
            .feature_columns
            .iter()
            .zip(importances)
            .map(|(feature, importance)| FeatureImportance {
                feature: feature.clone(),
                importance: *importance,
            })
            .collect();
        ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));
        ranked.truncate(TOP_FEATURES);
        Ok(ranked)
    }

    pub fn performance(&self) -> ModelPerformance {
        let Ok(Some(bundle)) = self.snapshot() else {
            return ModelPerformance::not_trained();
        };
        ModelPerformance {
            status: ForecasterStatus::Trained,
            models_available: bundle.model_names(),
            metrics: bundle.performance.clone(),
            bundle_id: Some(bundle.bundle_id.clone()),
            trained_at: Some(bundle.trained_at),
            training_samples: bundle.training_samples,
            feature_columns: bundle.feature_columns.clone(),
        }
    }

    /// Lowest-MAE model of the installed bundle.
    pub fn best_model(&self) -> Option<ModelKind> {
        self.snapshot().ok().flatten()?.best_model()
    }
}

fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt()
}

fn clip_round(value: f64) -> i64 {
    value.round().max(0.0) as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryBackend;
    use crate::forecasting::calendar::is_weekend;
    use async_trait::async_trait;

    fn config() -> ForecastingConfig {
        ForecastingConfig {
            n_trees: 20,
            boosting_stages: 50,
            ..Default::default()
        }
    }

    fn forecaster() -> DemandForecaster {
        DemandForecaster::new(Arc::new(InMemoryBackend::new()), config())
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// 90 days from Monday 2024-01-01: weekdays around 100, weekends around 120.
    fn weekly_series() -> Vec<TimeSeriesObservation> {
        let start = date(2024, 1, 1);
        (0..90)
            .map(|i| {
                let day = start + Duration::days(i);
                let weekend = is_weekend(day);
                let base = if weekend { 120 } else { 100 };
                let noise = ((i * 7) % 5) - 2;
                let mut obs = TimeSeriesObservation::new("hotel-1", day, base + noise);
                obs.is_weekend = weekend;
                obs.temperature = Some(15.0);
                obs
            })
            .collect()
    }

    struct FailingStore;

    #[async_trait]
    impl ModelStore for FailingStore {
        async fn save_bundle(&self, _bundle_id: &str, _blob: &[u8]) -> Result<()> {
            Err(TourismError::Persistence("disk full".to_string()))
        }

        async fn load_bundle(&self, _bundle_id: &str) -> Result<Option<Vec<u8>>> {
            Ok(None)
        }
    }

    #[test]
    fn test_fresh_forecaster_is_not_trained() {
        let forecaster = forecaster();
        assert!(!forecaster.is_trained());

        let input = vec![PartialObservation::new("hotel-1", date(2024, 4, 1))];
        assert!(matches!(
            forecaster.predict(&input, "random_forest"),
            Err(TourismError::NotTrained(_))
        ));
        assert!(matches!(
            forecaster.forecast_future("hotel-1", 7, &BaseConditions::default()),
            Err(TourismError::NotTrained(_))
        ));
        assert!(matches!(
            forecaster.feature_importance("random_forest"),
            Err(TourismError::NotTrained(_))
        ));
        assert_eq!(forecaster.performance().status, ForecasterStatus::NotTrained);
    }

    #[tokio::test]
    async fn test_weekend_forecast_exceeds_weekday() {
        let forecaster = forecaster();
        let report = forecaster.train(weekly_series()).await.unwrap();
        assert!(report.persisted);
        assert!(forecaster.is_trained());

        // Training ends Saturday 2024-03-30; forecast the following Friday and Saturday.
        let mut friday = PartialObservation::new("hotel-1", date(2024, 4, 5));
        friday.temperature = Some(15.0);
        let mut saturday = PartialObservation::new("hotel-1", date(2024, 4, 6));
        saturday.temperature = Some(15.0);

        for model in ["random_forest", "gradient_boosting"] {
            let points = forecaster.predict(&[friday.clone(), saturday.clone()], model).unwrap();
            assert!(
                points[1].predicted_visitors > points[0].predicted_visitors,
                "{model}: saturday {} <= friday {}",
                points[1].predicted_visitors,
                points[0].predicted_visitors
            );
        }
    }

    #[tokio::test]
    async fn test_intervals_are_ordered_and_non_negative() {
        let forecaster = forecaster();
        forecaster.train(weekly_series()).await.unwrap();

        for model in ["random_forest", "gradient_boosting", "linear_regression"] {
            let rows = future_rows("hotel-1", date(2024, 3, 31), 14, &BaseConditions::default());
            let points = forecaster.predict(&rows, model).unwrap();
            assert_eq!(points.len(), 14);
            for p in points {
                assert!(p.confidence_lower >= 0);
                assert!(p.confidence_lower <= p.predicted_visitors);
                assert!(p.predicted_visitors <= p.confidence_upper);
                assert_eq!(p.model_used, model);
            }
        }
    }

    #[tokio::test]
    async fn test_unknown_model_and_empty_input() {
        let forecaster = forecaster();
        forecaster.train(weekly_series()).await.unwrap();

        let input = vec![PartialObservation::new("hotel-1", date(2024, 4, 1))];
        assert!(matches!(
            forecaster.predict(&input, "prophet"),
            Err(TourismError::Validation(_))
        ));
        assert!(forecaster.predict(&[], "random_forest").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_forecast_future_starts_tomorrow() {
        let forecaster = forecaster();
        forecaster.train(weekly_series()).await.unwrap();

        let points = forecaster
            .forecast_future("hotel-1", 3, &BaseConditions::default())
            .unwrap();
        let tomorrow = Utc::now().date_naive() + Duration::days(1);
        assert_eq!(points.len(), 3);
        assert!(points[0].date == tomorrow || points[0].date == tomorrow + Duration::days(1));
        assert_eq!(points[2].date, points[0].date + Duration::days(2));
        assert!(points.iter().all(|p| p.model_used == "random_forest"));
    }

    #[tokio::test]
    async fn test_feature_importance() {
        let forecaster = forecaster();
        forecaster.train(weekly_series()).await.unwrap();

        let ranked = forecaster.feature_importance("random_forest").unwrap();
        assert!(ranked.len() <= 15);
        assert!(ranked.windows(2).all(|w| w[0].importance >= w[1].importance));

        assert!(matches!(
            forecaster.feature_importance("linear_regression"),
            Err(TourismError::Unsupported(_))
        ));
    }

    #[tokio::test]
    async fn test_persisted_bundle_loads_in_new_instance() {
        let store = Arc::new(InMemoryBackend::new());
        let first = DemandForecaster::new(store.clone(), config());
        first.train(weekly_series()).await.unwrap();

        let second = DemandForecaster::new(store, config());
        assert!(second.load().await.unwrap());

        let input = vec![PartialObservation::new("hotel-1", date(2024, 4, 6))];
        assert_eq!(
            first.predict(&input, "gradient_boosting").unwrap(),
            second.predict(&input, "gradient_boosting").unwrap()
        );
        assert_eq!(second.performance().status, ForecasterStatus::Trained);
    }

    #[tokio::test]
    async fn test_corrupt_bundle_loads_as_untrained() {
        let store = Arc::new(InMemoryBackend::new());
        store.save_bundle("demand_forecaster", b"{\"bundle_id\": \"x\"}").await.unwrap();

        let forecaster = DemandForecaster::new(store, config());
        assert!(!forecaster.load().await.unwrap());
        assert!(!forecaster.is_trained());
    }

    #[tokio::test]
    async fn test_persistence_failure_keeps_model() {
        let forecaster = DemandForecaster::new(Arc::new(FailingStore), config());
        let report = forecaster.train(weekly_series()).await.unwrap();

        assert!(!report.persisted);
        assert!(report.warning.unwrap().contains("disk full"));
        assert!(forecaster.is_trained());
    }

    #[tokio::test]
    async fn test_retrain_replaces_bundle() {
        let forecaster = forecaster();
        forecaster.train(weekly_series()).await.unwrap();
        let first = forecaster.current().unwrap();

        forecaster.train(weekly_series()).await.unwrap();
        let second = forecaster.current().unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(second.trained_at >= first.trained_at);
    }

    /// Delays the first save so a later training can overtake it.
    #[derive(Default)]
    struct SlowFirstSave {
        saves: std::sync::atomic::AtomicUsize,
        blob: std::sync::Mutex<Option<Vec<u8>>>,
    }

    #[async_trait]
    impl ModelStore for SlowFirstSave {
        async fn save_bundle(&self, _bundle_id: &str, blob: &[u8]) -> Result<()> {
            let call = self.saves.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if call == 0 {
                tokio::time::sleep(std::time::Duration::from_millis(200)).await;
            }
            *self.blob.lock().unwrap() = Some(blob.to_vec());
            Ok(())
        }

        async fn load_bundle(&self, _bundle_id: &str) -> Result<Option<Vec<u8>>> {
            Ok(self.blob.lock().unwrap().clone())
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_trainings_persist_installed_bundle() {
        let store = Arc::new(SlowFirstSave::default());
        let forecaster = Arc::new(DemandForecaster::new(store.clone(), config()));

        let (a, b) = tokio::join!(
            forecaster.train(weekly_series()),
            forecaster.train(weekly_series())
        );
        assert!(a.unwrap().persisted && b.unwrap().persisted);

        let blob = store.load_bundle("demand_forecaster").await.unwrap().unwrap();
        let persisted = TrainedModelSet::from_blob(&blob).unwrap();
        assert_eq!(persisted.trained_at, forecaster.current().unwrap().trained_at);
    }
}
