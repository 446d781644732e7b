use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tourism::api::{create_router, AppState};
use tourism::config::Config;
use tourism::db::{Database, LibSqlBackend};
use tourism::services::RetrainManager;

#[derive(Parser)]
#[command(name = "tourism")]
#[command(about = "Tourism analytics: demand forecasting, review sentiment and chat intents")]
struct Args {
    /// Train the demand models from stored observations before serving
    #[arg(long)]
    train_on_start: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tourism=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    if config.server.api_keys.is_empty() {
        tracing::warn!(
            "TOURISM_API_KEYS is not set. Every route except /api/v1/health and the docs is locked."
        );
    }

    tracing::info!("Initializing database...");
    let raw_db = Database::new(&config.database).await?;
    let backend = Arc::new(LibSqlBackend::new(raw_db));

    let state = AppState::new(config.clone(), backend)?;

    match state.forecaster.load().await {
        Ok(true) => tracing::info!("Loaded persisted demand models"),
        Ok(false) => tracing::info!("No persisted demand models found, forecaster is untrained"),
        Err(e) => tracing::warn!("Failed to load persisted demand models: {}", e),
    }

    if args.train_on_start {
        tracing::info!("Training demand models from stored observations...");
        match state.forecasting.train_models(None).await {
            Ok(report) => tracing::info!(
                "Startup training complete: best model {} on {} samples",
                report.best_model,
                report.training_samples
            ),
            Err(e) => tracing::warn!("Startup training skipped: {}", e),
        }
    }

    let cancel_token = CancellationToken::new();

    let retrain_interval = state.config.forecasting.retrain_interval_secs;
    if retrain_interval > 0 {
        tracing::info!("Starting retrain manager... (interval={}s)", retrain_interval);
        let manager = RetrainManager::new(state.forecasting.clone(), retrain_interval);
        let token = cancel_token.child_token();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        tracing::info!("Retrain manager shutting down...");
                        break;
                    }
                    _ = tokio::time::sleep(tokio::time::Duration::from_secs(manager.interval_secs())) => {
                        if let Err(e) = manager.run_once().await {
                            tracing::error!("Retrain manager error: {}", e);
                        }
                    }
                }
            }
        });
    }

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Tourism analytics starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/api/v1/health", addr);
    tracing::info!("  API docs:     http://{}/api/v1/docs", addr);
    tracing::info!("  OpenAPI spec: http://{}/api/v1/openapi.json", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel_token))
        .await?;

    Ok(())
}

async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, cancelling background tasks...");
    cancel_token.cancel();
}
