use async_trait::async_trait;
use lru::LruCache;
use serde_json::Value;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use super::Cache;
use crate::error::{Result, TourismError};

struct CacheEntry {
    value: Value,
    /// `None` when the TTL reaches past what `Instant` can represent.
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// Thread-safe in-process cache with LRU eviction and per-entry TTL.
#[derive(Clone)]
pub struct MemoryCache {
    entries: Arc<Mutex<LruCache<String, CacheEntry>>>,
}

impl MemoryCache {
    /// A zero capacity is bumped to one entry.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, LruCache<String, CacheEntry>>> {
        self.entries
            .lock()
            .map_err(|_| TourismError::Cache("cache lock poisoned".into()))
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let now = Instant::now();
        let mut entries = self.lock()?;

        let expired = match entries.get(key) {
            Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.value.clone())),
            Some(_) => true,
            None => false,
        };

        if expired {
            entries.pop(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<()> {
        let expires_at = Instant::now().checked_add(ttl);
        self.lock()?
            .put(key.to_string(), CacheEntry { value, expires_at });
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let now = Instant::now();
        Ok(self
            .lock()?
            .pop(key)
            .map(|entry| !entry.is_expired(now))
            .unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_get_after_set() {
        let cache = MemoryCache::new(10);
        cache
            .set("a", json!({"score": 0.5}), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(cache.get("a").await.unwrap(), Some(json!({"score": 0.5})));
    }

    #[tokio::test]
    async fn test_miss() {
        let cache = MemoryCache::new(10);
        assert_eq!(cache.get("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_entry_reads_as_absent() {
        let cache = MemoryCache::new(10);
        cache.set("a", json!(1), Duration::ZERO).await.unwrap();
        assert_eq!(cache.get("a").await.unwrap(), None);
        // expired entries are evicted on read
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_unbounded_ttl_never_expires() {
        let cache = MemoryCache::new(10);
        cache.set("a", json!(1), Duration::MAX).await.unwrap();
        assert_eq!(cache.get("a").await.unwrap(), Some(json!(1)));
        assert!(cache.delete("a").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete() {
        let cache = MemoryCache::new(10);
        cache.set("a", json!(1), Duration::from_secs(60)).await.unwrap();
        assert!(cache.delete("a").await.unwrap());
        assert!(!cache.delete("a").await.unwrap());
        assert_eq!(cache.get("a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_capacity_evicts_least_recently_used() {
        let cache = MemoryCache::new(2);
        let ttl = Duration::from_secs(60);
        cache.set("k1", json!(1), ttl).await.unwrap();
        cache.set("k2", json!(2), ttl).await.unwrap();
        cache.set("k3", json!(3), ttl).await.unwrap();

        assert_eq!(cache.get("k1").await.unwrap(), None);
        assert_eq!(cache.get("k2").await.unwrap(), Some(json!(2)));
        assert_eq!(cache.get("k3").await.unwrap(), Some(json!(3)));
    }

    #[tokio::test]
    async fn test_concurrent_access() {
        let cache = MemoryCache::new(100);
        let mut handles = vec![];

        for i in 0..10 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                let key = format!("key_{i}");
                cache
                    .set(&key, json!(i), Duration::from_secs(60))
                    .await
                    .unwrap();
                cache.get(&key).await.unwrap()
            }));
        }

        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.await.unwrap(), Some(json!(i)));
        }
    }
}
