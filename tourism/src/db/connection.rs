use libsql::{Builder, Connection};
use std::sync::Arc;

use crate::config::DatabaseConfig;
use crate::error::Result;

use super::schema;

/// Pragmas applied once at open. Failures are logged, not fatal, since remote
/// databases reject some of them.
const LOCAL_PRAGMAS: [&str; 3] = [
    "PRAGMA busy_timeout = 5000",
    "PRAGMA journal_mode = WAL",
    "PRAGMA synchronous = NORMAL",
];

#[derive(Clone)]
pub struct Database {
    db: Arc<libsql::Database>,
}

impl Database {
    /// Opens the configured database and creates any missing tables.
    ///
    /// `libsql://` and `https://` URLs connect to a remote server (as an
    /// embedded replica when `local_path` is set); `:memory:` and `file:`
    /// URLs open a local SQLite file.
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let token = config.auth_token.clone().unwrap_or_default();
        let db = if config.url.starts_with("libsql://") || config.url.starts_with("https://") {
            match config.local_path {
                Some(ref local_path) => {
                    Builder::new_remote_replica(local_path, config.url.clone(), token)
                        .build()
                        .await?
                }
                None => Builder::new_remote(config.url.clone(), token).build().await?,
            }
        } else {
            let path = config.url.strip_prefix("file:").unwrap_or(&config.url);
            Builder::new_local(path).build().await?
        };

        let database = Self { db: Arc::new(db) };
        let conn = database.connect()?;
        for pragma in LOCAL_PRAGMAS {
            if let Err(error) = conn.execute_batch(pragma).await {
                tracing::warn!(pragma, error = %error, "Failed to apply SQLite pragma");
            }
        }
        schema::init_schema(&conn).await?;

        tracing::info!(url = %config.url, "Database ready");
        Ok(database)
    }

    pub fn connect(&self) -> Result<Connection> {
        Ok(self.db.connect()?)
    }

    pub async fn sync(&self) -> Result<()> {
        if let Ok(sync) = self.db.sync().await {
            tracing::info!("Database synced: {:?}", sync);
        }
        Ok(())
    }
}
