use std::sync::Arc;

use crate::cache::{Cache, MemoryCache};
use crate::config::Config;
use crate::db::{ModelStore, StorageBackend};
use crate::error::Result;
use crate::forecasting::DemandForecaster;
use crate::intent::IntentClassifier;
use crate::sentiment::{HostedClassifier, SentimentScorer};
use crate::services::{AnalyticsService, ForecastingService, ReviewService};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn StorageBackend>,
    pub cache: Arc<dyn Cache>,
    pub scorer: SentimentScorer,
    pub intents: Arc<IntentClassifier>,
    pub forecaster: Arc<DemandForecaster>,
    pub forecasting: ForecastingService,
    pub reviews: Arc<ReviewService>,
    pub analytics: Arc<AnalyticsService>,
}

impl AppState {
    /// Wires every service over one backend. The forecaster starts untrained;
    /// call [`DemandForecaster::load`] to pick up a persisted bundle.
    pub fn new<B: StorageBackend + 'static>(config: Config, backend: Arc<B>) -> Result<Self> {
        let config = Arc::new(config);
        let store: Arc<dyn StorageBackend> = backend.clone();
        let models: Arc<dyn ModelStore> = backend;

        let cache: Arc<dyn Cache> = Arc::new(MemoryCache::new(config.cache.capacity));

        let mut scorer = SentimentScorer::new(cache.clone(), config.cache.sentiment_ttl());
        if let Some(model) = HostedClassifier::sentiment_from_config(&config.sentiment)? {
            tracing::info!(url = model.url(), "Advanced sentiment model enabled");
            scorer = scorer.with_advanced_model(Arc::new(model));
        }
        if let Some(model) = HostedClassifier::emotion_from_config(&config.sentiment)? {
            tracing::info!(url = model.url(), "Emotion model enabled");
            scorer = scorer.with_emotion_model(Arc::new(model));
        }

        let intents = Arc::new(IntentClassifier::new(
            cache.clone(),
            config.cache.intent_ttl(),
        )?);

        let forecaster = Arc::new(DemandForecaster::new(models, config.forecasting.clone()));
        let forecasting = ForecastingService::new(store.clone(), forecaster.clone());
        let reviews = Arc::new(ReviewService::new(store.clone(), scorer.clone()));
        let analytics = Arc::new(AnalyticsService::new(
            store.clone(),
            forecasting.clone(),
            scorer.clone(),
            intents.clone(),
            cache.clone(),
            config.cache.dashboard_ttl(),
        ));

        Ok(Self {
            config,
            store,
            cache,
            scorer,
            intents,
            forecaster,
            forecasting,
            reviews,
            analytics,
        })
    }
}
