//! Redis-based cache implementation.

use super::ttl::remaining_millis;
use super::CacheInterface;
use cachier_core::{CachierError, CachierResult, Clock, HealthCheck, HealthStatus, SystemClock};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deadpool_redis::Pool;
use redis::AsyncCommands;
use shaku::Component;
use std::sync::Arc;
use tracing::debug;

/// Redis-based cache service.
///
/// Expirations are sent as millisecond TTLs computed from the absolute
/// instant, so Redis enforces them.
#[derive(Component)]
#[shaku(interface = CacheInterface)]
pub struct RedisCacheService {
    /// Redis connection pool.
    pool: Arc<Pool>,
    #[shaku(default = Arc::new(SystemClock))]
    clock: Arc<dyn Clock>,
}

impl RedisCacheService {
    /// Create a new Redis cache service.
    #[must_use]
    pub fn new(pool: Arc<Pool>) -> Self {
        Self {
            pool,
            clock: Arc::new(SystemClock),
        }
    }

    /// Get a connection from the pool.
    async fn get_conn(&self) -> CachierResult<deadpool_redis::Connection> {
        self.pool
            .get()
            .await
            .map_err(|e| CachierError::Cache(format!("Failed to get Redis connection: {e}")))
    }
}

#[async_trait]
impl CacheInterface for RedisCacheService {
    async fn get_raw(&self, key: &str) -> CachierResult<Option<String>> {
        let mut conn = self.get_conn().await?;
        let value: Option<String> = conn.get(key).await.map_err(|e| {
            CachierError::Cache(format!("Failed to get key '{key}': {e}"))
        })?;

        match &value {
            Some(_) => debug!("Cache hit for key '{}'", key),
            None => debug!("Cache miss for key '{}'", key),
        }

        Ok(value)
    }

    async fn set_raw(&self, key: &str, value: &str, expires_at: DateTime<Utc>) -> CachierResult<()> {
        let mut conn = self.get_conn().await?;

        let Some(ttl_ms) = remaining_millis(self.clock.now(), expires_at) else {
            conn.del::<_, ()>(key).await.map_err(|e| {
                CachierError::Cache(format!("Failed to delete key '{key}': {e}"))
            })?;
            debug!("Expiration for key '{}' already passed; removed", key);
            return Ok(());
        };

        conn.pset_ex::<_, _, ()>(key, value, ttl_ms).await.map_err(|e| {
            CachierError::Cache(format!("Failed to set key '{key}': {e}"))
        })?;

        debug!("Cached key '{}' until {} ({}ms)", key, expires_at, ttl_ms);
        Ok(())
    }

    async fn delete(&self, key: &str) -> CachierResult<bool> {
        let mut conn = self.get_conn().await?;
        let deleted: i64 = conn.del(key).await.map_err(|e| {
            CachierError::Cache(format!("Failed to delete key '{key}': {e}"))
        })?;

        debug!("Deleted key '{}': {}", key, deleted > 0);
        Ok(deleted > 0)
    }

    async fn exists(&self, key: &str) -> CachierResult<bool> {
        let mut conn = self.get_conn().await?;
        let exists: bool = conn.exists(key).await.map_err(|e| {
            CachierError::Cache(format!("Failed to check key '{key}': {e}"))
        })?;

        Ok(exists)
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}

#[async_trait]
impl HealthCheck for RedisCacheService {
    fn name(&self) -> &str {
        "cache"
    }

    async fn check(&self) -> HealthStatus {
        let mut conn = match self.get_conn().await {
            Ok(conn) => conn,
            Err(e) => return HealthStatus::Unhealthy(e.to_string()),
        };

        let pong: Result<String, _> = redis::cmd("PING")
            .query_async(&mut conn)
            .await;

        match pong {
            Ok(_) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Unhealthy(format!("PING failed: {e}")),
        }
    }
}

impl std::fmt::Debug for RedisCacheService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCacheService")
            .field("pool", &self.pool.status())
            .finish_non_exhaustive()
    }
}
