//! In-memory implementation of CacheStore

use crate::core::error::CacheError;
use crate::core::store::CacheStore;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct Entry {
    payload: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// In-memory cache with per-entry expiry
///
/// Expiry uses `tokio::time::Instant`, so tests running on a paused clock
/// can move time forward with `tokio::time::advance`. Expired entries read
/// as absent and are dropped on access.
#[derive(Clone, Default)]
pub struct InMemoryCache {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .map(|entries| entries.values().filter(|e| !e.is_expired(now)).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &str) -> bool {
        let now = Instant::now();
        self.entries
            .read()
            .map(|entries| entries.get(key).is_some_and(|e| !e.is_expired(now)))
            .unwrap_or(false)
    }

    /// Remove every expired entry
    pub fn purge_expired(&self) {
        let now = Instant::now();
        if let Ok(mut entries) = self.entries.write() {
            entries.retain(|_, e| !e.is_expired(now));
        }
    }
}

#[async_trait]
impl CacheStore for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        let now = Instant::now();
        let mut entries = self
            .entries
            .write()
            .map_err(|e| CacheError::Unavailable(format!("Failed to acquire write lock: {}", e)))?;

        match entries.get(key) {
            None => return Ok(None),
            Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.payload.clone())),
            Some(_) => {}
        }
        entries.remove(key);
        Ok(None)
    }

    async fn set(&self, key: &str, payload: Value, lifetime: u64) -> Result<(), CacheError> {
        // A lifetime past the clock's range never expires in practice
        let expires_at = match lifetime {
            0 => None,
            secs => Instant::now().checked_add(Duration::from_secs(secs)),
        };
        let mut entries = self
            .entries
            .write()
            .map_err(|e| CacheError::Unavailable(format!("Failed to acquire write lock: {}", e)))?;

        entries.insert(
            key.to_string(),
            Entry {
                payload,
                expires_at,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| CacheError::Unavailable(format!("Failed to acquire write lock: {}", e)))?;

        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = InMemoryCache::new();
        cache.set("k", json!({"a": 1}), 60).await.unwrap();

        assert_eq!(cache.get("k").await.unwrap(), Some(json!({"a": 1})));
        assert_eq!(cache.get("missing").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires() {
        let cache = InMemoryCache::new();
        cache.set("k", json!(1), 10).await.unwrap();

        tokio::time::advance(Duration::from_secs(9)).await;
        assert!(cache.contains("k"));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get("k").await.unwrap(), None);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_lifetime_never_expires() {
        let cache = InMemoryCache::new();
        cache.set("k", json!(1), 0).await.unwrap();

        tokio::time::advance(Duration::from_secs(86_400)).await;
        assert_eq!(cache.get("k").await.unwrap(), Some(json!(1)));
    }

    #[tokio::test]
    async fn test_huge_lifetime_is_kept_without_expiry() {
        let cache = InMemoryCache::new();
        cache.set("k", json!(1), u64::MAX).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some(json!(1)));
    }

    #[tokio::test]
    async fn test_delete() {
        let cache = InMemoryCache::new();
        cache.set("k", json!(1), 60).await.unwrap();
        cache.delete("k").await.unwrap();
        assert!(!cache.contains("k"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_expired() {
        let cache = InMemoryCache::new();
        cache.set("short", json!(1), 1).await.unwrap();
        cache.set("long", json!(2), 100).await.unwrap();

        tokio::time::advance(Duration::from_secs(5)).await;
        cache.purge_expired();
        assert_eq!(cache.len(), 1);
        assert!(cache.contains("long"));
    }
}
