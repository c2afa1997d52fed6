//! Key-value cache abstraction.

use cachier_core::{CachierResult, Interface};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Key-value cache with per-key absolute expiration.
///
/// Values are opaque strings; typed access goes through a
/// [`Codec`](super::Codec). A miss is `Ok(None)`, never an error. Errors mean
/// the backend itself failed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheInterface: Interface + Send + Sync {
    /// Returns the stored value if present and not expired.
    async fn get_raw(&self, key: &str) -> CachierResult<Option<String>>;

    /// Stores a value until `expires_at`, overwriting any previous value.
    ///
    /// An `expires_at` that is not in the future removes the key.
    async fn set_raw(&self, key: &str, value: &str, expires_at: DateTime<Utc>) -> CachierResult<()>;

    /// Removes a key, returning whether it was present.
    async fn delete(&self, key: &str) -> CachierResult<bool>;

    /// Checks whether a live entry exists for a key.
    async fn exists(&self, key: &str) -> CachierResult<bool>;

    /// Short backend name for logs and health output.
    fn backend(&self) -> &'static str;
}
