use tracing::{error, info};

use super::ForecastingService;
use crate::error::{Result, TourismError};
use crate::models::TrainingReport;

/// Periodically refits the demand models on the stored observation window.
#[derive(Clone)]
pub struct RetrainManager {
    forecasting: ForecastingService,
    interval_secs: u64,
}

impl RetrainManager {
    pub fn new(forecasting: ForecastingService, interval_secs: u64) -> Self {
        Self {
            forecasting,
            interval_secs,
        }
    }

    /// Run a single retraining pass.
    ///
    /// Returns `None` when there is nothing to train on yet. The previous
    /// bundle stays installed if training fails.
    pub async fn run_once(&self) -> Result<Option<TrainingReport>> {
        info!("Starting scheduled retraining");

        match self.forecasting.train_models(None).await {
            Ok(report) => {
                info!(
                    "Scheduled retraining complete: best model {} on {} samples (persisted: {})",
                    report.best_model, report.training_samples, report.persisted
                );
                Ok(Some(report))
            }
            Err(TourismError::Validation(msg)) => {
                info!("Skipping scheduled retraining: {}", msg);
                Ok(None)
            }
            Err(e) => {
                error!("Scheduled retraining failed: {}", e);
                Err(e)
            }
        }
    }

    pub fn interval_secs(&self) -> u64 {
        self.interval_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DatabaseConfig, ForecastingConfig};
    use crate::db::{Database, LibSqlBackend, ModelStore, ObservationStore};
    use crate::forecasting::DemandForecaster;
    use crate::models::TimeSeriesObservation;
    use chrono::{Duration, Utc};
    use std::sync::Arc;
    use tempfile::NamedTempFile;

    async fn setup() -> (RetrainManager, Arc<LibSqlBackend>, NamedTempFile) {
        let file = NamedTempFile::new().unwrap();
        let config = DatabaseConfig {
            url: format!("file:{}", file.path().display()),
            auth_token: None,
            local_path: None,
        };
        let backend = Arc::new(LibSqlBackend::new(Database::new(&config).await.unwrap()));
        let forecaster = Arc::new(DemandForecaster::new(
            backend.clone(),
            ForecastingConfig {
                n_trees: 5,
                boosting_stages: 10,
                retrain_interval_secs: 3600,
                ..Default::default()
            },
        ));
        let service = ForecastingService::new(backend.clone(), forecaster);
        (RetrainManager::new(service, 3600), backend, file)
    }

    #[tokio::test]
    async fn test_run_once_without_data() {
        let (manager, _backend, _file) = setup().await;
        assert!(manager.run_once().await.unwrap().is_none());
        assert_eq!(manager.interval_secs(), 3600);
    }

    #[tokio::test]
    async fn test_run_once_trains_and_persists() {
        let (manager, backend, _file) = setup().await;
        let today = Utc::now().date_naive();
        for i in 1..=20 {
            backend
                .append_observation(&TimeSeriesObservation::new(
                    "museum",
                    today - Duration::days(i),
                    200 + i,
                ))
                .await
                .unwrap();
        }
        // outside the training window
        backend
            .append_observation(&TimeSeriesObservation::new(
                "museum",
                today - Duration::days(2000),
                5,
            ))
            .await
            .unwrap();

        let report = manager.run_once().await.unwrap().unwrap();
        assert_eq!(report.training_samples + report.test_samples, 20);
        assert!(report.persisted);
        assert!(backend.load_bundle("demand_forecaster").await.unwrap().is_some());
    }
}
