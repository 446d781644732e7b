// Common test utilities for integration tests
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Once};

use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};
use tempfile::TempDir;
use tourism::api::{create_router, AppState};
use tourism::config::{
    CacheConfig, Config, DatabaseConfig, ForecastingConfig, SentimentModelConfig, ServerConfig,
};
use tourism::db::{Database, LibSqlBackend};
use tourism::models::TimeSeriesObservation;

pub const API_KEY: &str = "test-key";

static INIT: Once = Once::new();

/// Initialize tracing subscriber once for tests
pub fn init_test_logger() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// `days` consecutive days ending yesterday. Weekends draw 1.2x the weekday crowd.
pub fn weekly_series(business_id: &str, days: i64) -> Vec<TimeSeriesObservation> {
    let start = Utc::now().date_naive() - Duration::days(days);
    (0..days)
        .map(|i| {
            let date = start + Duration::days(i);
            let weekend = is_weekend(date);
            let base = if weekend { 240 } else { 200 };
            let noise = (i * 7) % 5 - 2;
            let mut obs = TimeSeriesObservation::new(business_id, date, base + noise);
            obs.is_weekend = weekend;
            obs.temperature = Some(18.0);
            obs.revenue = Some(f64::from(base as i32) * 12.5);
            obs
        })
        .collect()
}

/// Env-independent configuration against the libsql file at `db_url`.
pub fn test_config(db_url: String) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            api_keys: vec![API_KEY.to_string()],
        },
        database: DatabaseConfig {
            url: db_url,
            auth_token: None,
            local_path: None,
        },
        cache: CacheConfig::default(),
        forecasting: ForecastingConfig {
            n_trees: 10,
            boosting_stages: 20,
            ..Default::default()
        },
        sentiment: SentimentModelConfig::default(),
    }
}

pub fn db_url(dir: &TempDir) -> String {
    format!("file:{}", dir.path().join("tourism_test.db").display())
}

pub async fn build_state(config: Config) -> AppState {
    let db = Database::new(&config.database)
        .await
        .expect("Failed to create database");
    let state = AppState::new(config, Arc::new(LibSqlBackend::new(db)))
        .expect("Failed to build app state");
    state.forecaster.load().await.expect("Failed to load bundle");
    state
}

/// Serves the full router on an ephemeral port.
pub async fn spawn_app(state: AppState) -> SocketAddr {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to get address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    addr
}
