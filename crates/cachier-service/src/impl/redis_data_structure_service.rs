//! Redis implementation of the data-structure passthrough.

use crate::data_structure_service::DataStructureService;
use crate::dto::TransactionOp;
use cachier_core::{CachierError, CachierResult, Clock, SystemClock};
use async_trait::async_trait;
use crate::cache::ttl::remaining_millis;
use chrono::{DateTime, Utc};
use deadpool_redis::Pool;
use redis::{AsyncCommands, Client, RedisError};
use futures::StreamExt;
use parking_lot::Mutex;
use shaku::Component;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Data-structure service over the shared Redis pool.
///
/// Commands borrow pooled connections. Pub/sub listeners need a connection
/// of their own and open it from `client`.
#[derive(Component)]
#[shaku(interface = DataStructureService)]
pub struct RedisDataStructureService {
    pool: Arc<Pool>,
    client: Client,
    #[shaku(default = Arc::new(SystemClock))]
    clock: Arc<dyn Clock>,
    #[shaku(default)]
    listeners: Listeners,
}

/// Pub/sub listener tasks, one per subscribed channel.
#[derive(Default)]
pub struct Listeners {
    running: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl RedisDataStructureService {
    #[must_use]
    pub fn new(pool: Arc<Pool>, client: Client) -> Self {
        Self {
            pool,
            client,
            clock: Arc::new(SystemClock),
            listeners: Listeners::default(),
        }
    }

    async fn get_conn(&self) -> CachierResult<deadpool_redis::Connection> {
        self.pool
            .get()
            .await
            .map_err(|e| CachierError::Cache(format!("Failed to get Redis connection: {e}")))
    }
}

fn failed<'a>(op: &'static str, key: &'a str) -> impl FnOnce(RedisError) -> CachierError + 'a {
    move |e| CachierError::Cache(format!("{op} '{key}' failed: {e}"))
}

/// Converts a Redis range index.
fn index(i: i64) -> CachierResult<isize> {
    isize::try_from(i).map_err(|_| CachierError::validation(format!("Index {i} is out of range")))
}

#[async_trait]
impl DataStructureService for RedisDataStructureService {
    async fn set_string(&self, key: &str, value: &str, expires_at: Option<DateTime<Utc>>) -> CachierResult<bool> {
        let mut conn = self.get_conn().await?;

        match expires_at {
            None => {
                conn.set::<_, _, ()>(key, value).await.map_err(failed("SET", key))?;
            }
            Some(at) => {
                let Some(ttl_ms) = remaining_millis(self.clock.now(), at) else {
                    debug!("Expiration for '{}' already passed; not written", key);
                    return Ok(false);
                };
                conn.pset_ex::<_, _, ()>(key, value, ttl_ms)
                    .await
                    .map_err(failed("SET PX", key))?;
            }
        }

        Ok(true)
    }

    async fn get_string(&self, key: &str) -> CachierResult<Option<String>> {
        let mut conn = self.get_conn().await?;
        conn.get(key).await.map_err(failed("GET", key))
    }

    async fn remove_string(&self, key: &str) -> CachierResult<bool> {
        self.remove_data(key).await
    }

    async fn set_hash_field(&self, key: &str, field: &str, value: &str) -> CachierResult<bool> {
        let mut conn = self.get_conn().await?;
        let added: i64 = conn.hset(key, field, value).await.map_err(failed("HSET", key))?;
        Ok(added > 0)
    }

    async fn get_hash_field(&self, key: &str, field: &str) -> CachierResult<Option<String>> {
        let mut conn = self.get_conn().await?;
        conn.hget(key, field).await.map_err(failed("HGET", key))
    }

    async fn remove_hash_field(&self, key: &str, field: &str) -> CachierResult<bool> {
        let mut conn = self.get_conn().await?;
        let removed: i64 = conn.hdel(key, field).await.map_err(failed("HDEL", key))?;
        Ok(removed > 0)
    }

    async fn get_all_hash_fields(&self, key: &str) -> CachierResult<BTreeMap<String, String>> {
        let mut conn = self.get_conn().await?;
        conn.hgetall(key).await.map_err(failed("HGETALL", key))
    }

    async fn add_to_list(&self, key: &str, value: &str) -> CachierResult<bool> {
        let mut conn = self.get_conn().await?;
        let len: i64 = conn.rpush(key, value).await.map_err(failed("RPUSH", key))?;
        Ok(len > 0)
    }

    async fn get_list(&self, key: &str, start: i64, stop: i64) -> CachierResult<Vec<String>> {
        let (start, stop) = (index(start)?, index(stop)?);
        let mut conn = self.get_conn().await?;
        conn.lrange(key, start, stop).await.map_err(failed("LRANGE", key))
    }

    async fn remove_from_list(&self, key: &str, value: &str) -> CachierResult<bool> {
        let mut conn = self.get_conn().await?;
        let removed: i64 = conn.lrem(key, 0, value).await.map_err(failed("LREM", key))?;
        Ok(removed > 0)
    }

    async fn add_to_set(&self, key: &str, value: &str) -> CachierResult<bool> {
        let mut conn = self.get_conn().await?;
        let added: i64 = conn.sadd(key, value).await.map_err(failed("SADD", key))?;
        Ok(added > 0)
    }

    async fn get_set_members(&self, key: &str) -> CachierResult<Vec<String>> {
        let mut conn = self.get_conn().await?;
        let mut members: Vec<String> = conn.smembers(key).await.map_err(failed("SMEMBERS", key))?;
        members.sort();
        Ok(members)
    }

    async fn remove_from_set(&self, key: &str, value: &str) -> CachierResult<bool> {
        let mut conn = self.get_conn().await?;
        let removed: i64 = conn.srem(key, value).await.map_err(failed("SREM", key))?;
        Ok(removed > 0)
    }

    async fn add_to_sorted_set(&self, key: &str, value: &str, score: f64) -> CachierResult<bool> {
        let mut conn = self.get_conn().await?;
        let added: i64 = conn.zadd(key, value, score).await.map_err(failed("ZADD", key))?;
        Ok(added > 0)
    }

    async fn get_sorted_set_range(&self, key: &str, start: i64, stop: i64) -> CachierResult<Vec<String>> {
        let (start, stop) = (index(start)?, index(stop)?);
        let mut conn = self.get_conn().await?;
        conn.zrange(key, start, stop).await.map_err(failed("ZRANGE", key))
    }

    async fn remove_from_sorted_set(&self, key: &str, value: &str) -> CachierResult<bool> {
        let mut conn = self.get_conn().await?;
        let removed: i64 = conn.zrem(key, value).await.map_err(failed("ZREM", key))?;
        Ok(removed > 0)
    }

    async fn add_to_hyperloglog(&self, key: &str, values: &[String]) -> CachierResult<bool> {
        if values.is_empty() {
            return Ok(false);
        }
        let mut conn = self.get_conn().await?;
        conn.pfadd(key, values).await.map_err(failed("PFADD", key))
    }

    async fn get_hyperloglog_count(&self, key: &str) -> CachierResult<u64> {
        let mut conn = self.get_conn().await?;
        conn.pfcount(key).await.map_err(failed("PFCOUNT", key))
    }

    async fn execute_transaction(&self, ops: &[TransactionOp]) -> CachierResult<bool> {
        if ops.is_empty() {
            return Err(CachierError::validation("A transaction needs at least one operation"));
        }

        let mut pipe = redis::pipe();
        pipe.atomic();
        for op in ops {
            match op {
                TransactionOp::Set { key, value } => {
                    pipe.set(key, value).ignore();
                }
                TransactionOp::Delete { key } => {
                    pipe.del(key).ignore();
                }
            }
        }

        let mut conn = self.get_conn().await?;
        let (): () = pipe
            .query_async(&mut *conn)
            .await
            .map_err(|e| CachierError::Cache(format!("MULTI/EXEC failed: {e}")))?;

        debug!("Transaction of {} operations committed", ops.len());
        Ok(true)
    }

    async fn publish(&self, channel: &str, message: &str) -> CachierResult<u64> {
        let mut conn = self.get_conn().await?;
        let receivers: u64 = conn.publish(channel, message).await.map_err(failed("PUBLISH", channel))?;
        debug!("Published to '{}' ({} receivers)", channel, receivers);
        Ok(receivers)
    }

    async fn subscribe(&self, channel: &str) -> CachierResult<bool> {
        let running = |listeners: &HashMap<String, JoinHandle<()>>| {
            listeners.get(channel).is_some_and(|h| !h.is_finished())
        };

        if running(&self.listeners.running.lock()) {
            return Ok(false);
        }

        let mut pubsub = self
            .client
            .get_async_pubsub()
            .await
            .map_err(failed("Pub/sub connect", channel))?;
        pubsub.subscribe(channel).await.map_err(failed("SUBSCRIBE", channel))?;

        let mut listeners = self.listeners.running.lock();
        if running(&listeners) {
            return Ok(false);
        }

        let name = channel.to_string();
        let handle = tokio::spawn(async move {
            let mut messages = pubsub.into_on_message();
            while let Some(msg) = messages.next().await {
                match msg.get_payload::<String>() {
                    Ok(payload) => info!(channel = %msg.get_channel_name(), %payload, "Message received"),
                    Err(e) => warn!(channel = %msg.get_channel_name(), error = %e, "Unreadable message"),
                }
            }
            info!(channel = %name, "Subscription closed");
        });
        listeners.insert(channel.to_string(), handle);

        info!("Subscribed to channel '{}'", channel);
        Ok(true)
    }

    fn unsubscribe(&self, channel: &str) -> bool {
        match self.listeners.running.lock().remove(channel) {
            Some(handle) => {
                handle.abort();
                info!("Unsubscribed from channel '{}'", channel);
                true
            }
            None => false,
        }
    }

    fn subscriptions(&self) -> Vec<String> {
        let mut channels: Vec<String> = self
            .listeners
            .running
            .lock()
            .iter()
            .filter(|(_, h)| !h.is_finished())
            .map(|(c, _)| c.clone())
            .collect();
        channels.sort();
        channels
    }

    async fn key_exists(&self, key: &str) -> CachierResult<bool> {
        let mut conn = self.get_conn().await?;
        conn.exists(key).await.map_err(failed("EXISTS", key))
    }

    async fn remove_data(&self, key: &str) -> CachierResult<bool> {
        let mut conn = self.get_conn().await?;
        let removed: i64 = conn.del(key).await.map_err(failed("DEL", key))?;
        Ok(removed > 0)
    }
}

impl Drop for RedisDataStructureService {
    fn drop(&mut self) {
        for (_, handle) in self.listeners.running.get_mut().drain() {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for RedisDataStructureService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisDataStructureService")
            .field("subscriptions", &self.subscriptions())
            .finish_non_exhaustive()
    }
}
