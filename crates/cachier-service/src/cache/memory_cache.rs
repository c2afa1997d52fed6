//! In-process cache backend.

use super::CacheInterface;
use cachier_core::{CachierResult, Clock, HealthCheck, HealthStatus, SystemClock};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use shaku::Component;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: DateTime<Utc>,
}

impl Entry {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Expiring key-value map held in process memory.
///
/// Used when Redis is disabled and as the cache in tests. Expired entries
/// are dropped lazily when touched, or in bulk by [`purge_expired`].
/// Clones share the same map.
///
/// [`purge_expired`]: MemoryCacheService::purge_expired
#[derive(Component, Clone)]
#[shaku(interface = CacheInterface)]
pub struct MemoryCacheService {
    #[shaku(default)]
    entries: Arc<RwLock<HashMap<String, Entry>>>,
    #[shaku(default = Arc::new(SystemClock))]
    clock: Arc<dyn Clock>,
}

impl MemoryCacheService {
    /// Creates an empty cache on wall-clock time.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty cache reading time from `clock`.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            clock,
        }
    }

    /// Number of stored entries, including expired ones not yet dropped.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true when nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Returns the expiration of a live entry.
    #[must_use]
    pub fn expires_at(&self, key: &str) -> Option<DateTime<Utc>> {
        let now = self.clock.now();
        self.entries
            .read()
            .get(key)
            .filter(|e| e.is_live(now))
            .map(|e| e.expires_at)
    }

    /// Drops every expired entry and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, e| e.is_live(now));
        before - entries.len()
    }
}

impl Default for MemoryCacheService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheInterface for MemoryCacheService {
    async fn get_raw(&self, key: &str) -> CachierResult<Option<String>> {
        let now = self.clock.now();
        {
            let entries = self.entries.read();
            match entries.get(key) {
                Some(entry) if entry.is_live(now) => return Ok(Some(entry.value.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }

        // Expired: drop it unless a writer replaced it in the meantime.
        let mut entries = self.entries.write();
        if entries.get(key).is_some_and(|e| !e.is_live(now)) {
            entries.remove(key);
            debug!("Expired key '{}' dropped", key);
        }
        Ok(None)
    }

    async fn set_raw(&self, key: &str, value: &str, expires_at: DateTime<Utc>) -> CachierResult<()> {
        let mut entries = self.entries.write();
        if expires_at <= self.clock.now() {
            entries.remove(key);
            return Ok(());
        }
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> CachierResult<bool> {
        let now = self.clock.now();
        Ok(self
            .entries
            .write()
            .remove(key)
            .is_some_and(|e| e.is_live(now)))
    }

    async fn exists(&self, key: &str) -> CachierResult<bool> {
        Ok(self.expires_at(key).is_some())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[async_trait]
impl HealthCheck for MemoryCacheService {
    fn name(&self) -> &str {
        "cache"
    }

    async fn check(&self) -> HealthStatus {
        HealthStatus::Healthy
    }
}

impl std::fmt::Debug for MemoryCacheService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCacheService")
            .field("entries", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cachier_core::ManualClock;
    use std::time::Duration;

    fn cache() -> (MemoryCacheService, ManualClock) {
        let clock = ManualClock::default();
        (MemoryCacheService::with_clock(Arc::new(clock.clone())), clock)
    }

    #[tokio::test]
    async fn test_get_before_and_after_expiry() {
        let (cache, clock) = cache();
        let expires = clock.expires_in(Duration::from_secs(45));
        cache.set_raw("k", "v", expires).await.unwrap();

        assert_eq!(cache.get_raw("k").await.unwrap().as_deref(), Some("v"));

        clock.advance(Duration::from_secs(46));
        assert!(cache.get_raw("k").await.unwrap().is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_expiry_boundary_is_absent() {
        let (cache, clock) = cache();
        let expires = clock.expires_in(Duration::from_secs(10));
        cache.set_raw("k", "v", expires).await.unwrap();

        clock.set(expires);
        assert!(!cache.exists("k").await.unwrap());
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let (cache, clock) = cache();
        let expires = clock.expires_in(Duration::from_secs(10));
        cache.set_raw("k", "one", expires).await.unwrap();
        cache.set_raw("k", "two", expires).await.unwrap();
        assert_eq!(cache.get_raw("k").await.unwrap().as_deref(), Some("two"));
    }

    #[tokio::test]
    async fn test_set_in_past_removes_key() {
        let (cache, clock) = cache();
        cache
            .set_raw("k", "v", clock.expires_in(Duration::from_secs(10)))
            .await
            .unwrap();
        cache.set_raw("k", "stale", clock.now()).await.unwrap();
        assert!(cache.get_raw("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_reports_presence() {
        let (cache, clock) = cache();
        cache
            .set_raw("k", "v", clock.expires_in(Duration::from_secs(10)))
            .await
            .unwrap();
        assert!(cache.delete("k").await.unwrap());
        assert!(!cache.delete("k").await.unwrap());
        assert!(!cache.delete("never").await.unwrap());
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let (cache, clock) = cache();
        cache
            .set_raw("short", "v", clock.expires_in(Duration::from_secs(1)))
            .await
            .unwrap();
        cache
            .set_raw("long", "v", clock.expires_in(Duration::from_secs(100)))
            .await
            .unwrap();

        clock.advance(Duration::from_secs(2));
        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let (cache, clock) = cache();
        let view = cache.clone();
        cache
            .set_raw("k", "v", clock.expires_in(Duration::from_secs(10)))
            .await
            .unwrap();

        assert_eq!(view.get_raw("k").await.unwrap().as_deref(), Some("v"));
        clock.advance(Duration::from_secs(11));
        assert_eq!(view.purge_expired(), 1);
        assert!(cache.is_empty());
    }
}
