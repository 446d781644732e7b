//! Key-value cache with per-entry expiration.
//!
//! The analytics core treats the cache as advisory: a failed read is a miss and
//! a failed write is ignored. Use [`get_json`] and [`set_json`] for that
//! behavior; the raw [`Cache`] trait still reports errors so stores can be tested.

mod memory;

pub use memory::MemoryCache;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::time::Duration;

use crate::error::Result;

#[async_trait]
pub trait Cache: Send + Sync {
    /// Returns `None` for missing or expired keys.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<()>;

    /// Returns whether a live entry was removed.
    async fn delete(&self, key: &str) -> Result<bool>;
}

/// Builds `<namespace>:<sha256 hex of text>`.
pub fn hashed_key(namespace: &str, text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    format!("{}:{:x}", namespace, digest)
}

/// Best-effort typed read. Errors and undecodable values count as a miss.
pub async fn get_json<T: DeserializeOwned>(cache: &dyn Cache, key: &str) -> Option<T> {
    match cache.get(key).await {
        Ok(Some(value)) => match serde_json::from_value(value) {
            Ok(decoded) => {
                tracing::debug!(key, "cache hit");
                Some(decoded)
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "discarding undecodable cache entry");
                None
            }
        },
        Ok(None) => {
            tracing::debug!(key, "cache miss");
            None
        }
        Err(e) => {
            tracing::warn!(key, error = %e, "cache read failed, recomputing");
            None
        }
    }
}

/// Best-effort typed write. Failures are logged and dropped.
pub async fn set_json<T: Serialize>(cache: &dyn Cache, key: &str, value: &T, ttl: Duration) {
    let encoded = match serde_json::to_value(value) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to encode cache value");
            return;
        }
    };

    if let Err(e) = cache.set(key, encoded, ttl).await {
        tracing::warn!(key, error = %e, "cache write failed");
    }
}
