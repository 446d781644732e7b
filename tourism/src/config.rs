use serde::Deserialize;
use std::env;
use std::time::Duration;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

fn parse_env_opt<T: std::str::FromStr>(var: &str) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) if val.trim().is_empty() => None,
        Ok(val) => match val.parse() {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Ignoring.", val, var, e);
                None
            }
        },
        Err(_) => None,
    }
}

/// Comma-separated list, blank entries dropped.
fn parse_env_list(var: &str) -> Vec<String> {
    env::var(var)
        .map(|raw| {
            raw.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub forecasting: ForecastingConfig,
    pub sentiment: SentimentModelConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub api_keys: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub auth_token: Option<String>,
    pub local_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    pub capacity: usize,
    pub sentiment_ttl_secs: u64,
    pub intent_ttl_secs: u64,
    pub dashboard_ttl_secs: u64,
}

impl CacheConfig {
    pub fn sentiment_ttl(&self) -> Duration {
        Duration::from_secs(self.sentiment_ttl_secs)
    }

    pub fn intent_ttl(&self) -> Duration {
        Duration::from_secs(self.intent_ttl_secs)
    }

    pub fn dashboard_ttl(&self) -> Duration {
        Duration::from_secs(self.dashboard_ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 10_000,
            sentiment_ttl_secs: 3600,
            intent_ttl_secs: 1800,
            dashboard_ttl_secs: 300,
        }
    }
}

/// Demand forecaster settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastingConfig {
    /// Key under which the trained bundle is persisted.
    pub bundle_id: String,
    pub default_model: String,
    pub n_trees: usize,
    pub boosting_stages: usize,
    pub training_window_days: i64,
    /// Background retraining interval. Zero disables the loop.
    pub retrain_interval_secs: u64,
}

impl Default for ForecastingConfig {
    fn default() -> Self {
        Self {
            bundle_id: "demand_forecaster".to_string(),
            default_model: "random_forest".to_string(),
            n_trees: 100,
            boosting_stages: 100,
            training_window_days: 730,
            retrain_interval_secs: 0,
        }
    }
}

/// Optional hosted classifiers backing the advanced sentiment and emotion paths.
#[derive(Debug, Clone, Deserialize)]
pub struct SentimentModelConfig {
    pub model_url: Option<String>,
    pub emotion_model_url: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for SentimentModelConfig {
    fn default() -> Self {
        Self {
            model_url: None,
            emotion_model_url: None,
            api_key: None,
            timeout_secs: 10,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let cache_defaults = CacheConfig::default();
        let forecast_defaults = ForecastingConfig::default();

        Self {
            server: ServerConfig {
                host: env::var("TOURISM_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("TOURISM_PORT", 8000),
                api_keys: parse_env_list("TOURISM_API_KEYS"),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or_else(|_| "file:tourism.db".to_string()),
                auth_token: env::var("DATABASE_AUTH_TOKEN").ok(),
                local_path: env::var("DATABASE_LOCAL_PATH").ok(),
            },
            cache: CacheConfig {
                capacity: parse_env_or("CACHE_CAPACITY", cache_defaults.capacity),
                sentiment_ttl_secs: parse_env_or(
                    "SENTIMENT_CACHE_TTL_SECS",
                    cache_defaults.sentiment_ttl_secs,
                ),
                intent_ttl_secs: parse_env_or("INTENT_CACHE_TTL_SECS", cache_defaults.intent_ttl_secs),
                dashboard_ttl_secs: parse_env_or(
                    "DASHBOARD_CACHE_TTL_SECS",
                    cache_defaults.dashboard_ttl_secs,
                ),
            },
            forecasting: ForecastingConfig {
                bundle_id: env::var("FORECAST_BUNDLE_ID").unwrap_or(forecast_defaults.bundle_id),
                default_model: env::var("FORECAST_DEFAULT_MODEL")
                    .unwrap_or(forecast_defaults.default_model),
                n_trees: parse_env_or("FORECAST_TREES", forecast_defaults.n_trees),
                boosting_stages: parse_env_or(
                    "FORECAST_BOOSTING_STAGES",
                    forecast_defaults.boosting_stages,
                ),
                training_window_days: parse_env_or(
                    "FORECAST_TRAINING_WINDOW_DAYS",
                    forecast_defaults.training_window_days,
                ),
                retrain_interval_secs: parse_env_or(
                    "FORECAST_RETRAIN_INTERVAL_SECS",
                    forecast_defaults.retrain_interval_secs,
                ),
            },
            sentiment: SentimentModelConfig {
                model_url: parse_env_opt("SENTIMENT_MODEL_URL"),
                emotion_model_url: parse_env_opt("EMOTION_MODEL_URL"),
                api_key: parse_env_opt("SENTIMENT_MODEL_API_KEY"),
                timeout_secs: parse_env_or("SENTIMENT_MODEL_TIMEOUT_SECS", 10),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}
