//! Redis data-structure passthrough.

use crate::dto::TransactionOp;
use cachier_core::{CachierResult, Interface};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Direct access to Redis strings, hashes, lists, sets, sorted sets,
/// HyperLogLogs, transactions and pub/sub.
///
/// Results follow Redis: "added" and "removed" flags report whether the
/// command changed anything, reads of missing keys come back empty.
#[async_trait]
pub trait DataStructureService: Interface + Send + Sync {
    // ============ Strings ============

    /// Sets a string, optionally expiring at `expires_at`.
    ///
    /// Returns false without writing when `expires_at` is not in the future.
    async fn set_string(&self, key: &str, value: &str, expires_at: Option<DateTime<Utc>>) -> CachierResult<bool>;

    async fn get_string(&self, key: &str) -> CachierResult<Option<String>>;

    async fn remove_string(&self, key: &str) -> CachierResult<bool>;

    // ============ Hashes ============

    /// Sets a hash field, returning true when the field is new.
    async fn set_hash_field(&self, key: &str, field: &str, value: &str) -> CachierResult<bool>;

    async fn get_hash_field(&self, key: &str, field: &str) -> CachierResult<Option<String>>;

    async fn remove_hash_field(&self, key: &str, field: &str) -> CachierResult<bool>;

    async fn get_all_hash_fields(&self, key: &str) -> CachierResult<BTreeMap<String, String>>;

    // ============ Lists ============

    /// Appends to the tail of a list.
    async fn add_to_list(&self, key: &str, value: &str) -> CachierResult<bool>;

    /// Returns the inclusive index range; negative indexes count from the end.
    async fn get_list(&self, key: &str, start: i64, stop: i64) -> CachierResult<Vec<String>>;

    /// Removes every occurrence of `value`.
    async fn remove_from_list(&self, key: &str, value: &str) -> CachierResult<bool>;

    // ============ Sets ============

    async fn add_to_set(&self, key: &str, value: &str) -> CachierResult<bool>;

    async fn get_set_members(&self, key: &str) -> CachierResult<Vec<String>>;

    async fn remove_from_set(&self, key: &str, value: &str) -> CachierResult<bool>;

    // ============ Sorted sets ============

    async fn add_to_sorted_set(&self, key: &str, value: &str, score: f64) -> CachierResult<bool>;

    /// Members by ascending score within the inclusive index range.
    async fn get_sorted_set_range(&self, key: &str, start: i64, stop: i64) -> CachierResult<Vec<String>>;

    async fn remove_from_sorted_set(&self, key: &str, value: &str) -> CachierResult<bool>;

    // ============ HyperLogLog ============

    /// Adds values, returning true when the cardinality estimate changed.
    async fn add_to_hyperloglog(&self, key: &str, values: &[String]) -> CachierResult<bool>;

    async fn get_hyperloglog_count(&self, key: &str) -> CachierResult<u64>;

    // ============ Transactions ============

    /// Runs the operations inside MULTI/EXEC.
    async fn execute_transaction(&self, ops: &[TransactionOp]) -> CachierResult<bool>;

    // ============ Pub/Sub ============

    /// Publishes a message, returning the number of receivers.
    async fn publish(&self, channel: &str, message: &str) -> CachierResult<u64>;

    /// Starts a background listener that logs every message on `channel`.
    ///
    /// Returns false when the channel already has a listener.
    async fn subscribe(&self, channel: &str) -> CachierResult<bool>;

    /// Stops the listener for `channel`, returning whether one was running.
    fn unsubscribe(&self, channel: &str) -> bool;

    /// Channels with a running listener.
    fn subscriptions(&self) -> Vec<String>;

    // ============ Keys ============

    async fn key_exists(&self, key: &str) -> CachierResult<bool>;

    async fn remove_data(&self, key: &str) -> CachierResult<bool>;
}
