//! Read-through caching over a record store.
//!
//! [`CacheAside`] serves reads from the cache when it holds a usable value
//! and otherwise loads from the [`RecordStore`], writing the result back
//! with a fixed time-to-live. Writes go to the store first; the cache is
//! then updated for the touched record only, unless the policy asks for
//! dependent collections to be dropped as well.
//!
//! ```text
//! read_collection("customers")
//!   cache.get_raw("customers") ── hit, non-empty ──> decoded records
//!        │ miss / empty / undecodable
//!        v
//!   store.list_all() ──> cache.set_raw("customers", json, now + ttl)
//! ```

use super::{cache_keys, CacheInterface, Codec, JsonCodec, SingleFlight};
use cachier_config::CacheConfig;
use cachier_core::{CachierError, CachierResult, Clock, Entity, SystemClock};
use cachier_repository::RecordStore;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// How [`CacheAside`] treats the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// Lifetime of every entry written by the orchestrator.
    pub ttl: Duration,
    /// Treat cache failures as misses and skipped writes instead of errors.
    pub fail_open: bool,
    /// Collapse concurrent misses on one key into a single store load.
    pub single_flight: bool,
    /// Evict registered collection keys after every create and delete.
    pub invalidate_collection_on_write: bool,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(45),
            fail_open: true,
            single_flight: true,
            invalidate_collection_on_write: false,
        }
    }
}

impl CachePolicy {
    /// Builds a policy from the `[cache]` configuration section.
    #[must_use]
    pub const fn from_config(config: &CacheConfig) -> Self {
        Self {
            ttl: config.ttl(),
            fail_open: config.fail_open,
            single_flight: config.single_flight,
            invalidate_collection_on_write: config.invalidate_collection_on_write,
        }
    }
}

/// Everything a load needs, detached from the orchestrator so that a shared
/// load can outlive the request that started it.
struct Backends<S: ?Sized, C> {
    store: Arc<S>,
    cache: Arc<dyn CacheInterface>,
    clock: Arc<dyn Clock>,
    codec: C,
    policy: CachePolicy,
}

impl<S: ?Sized, C: Clone> Clone for Backends<S, C> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            cache: Arc::clone(&self.cache),
            clock: Arc::clone(&self.clock),
            codec: self.codec.clone(),
            policy: self.policy,
        }
    }
}

impl<S, C> Backends<S, C>
where
    S: RecordStore + ?Sized,
    S::Record: Serialize + DeserializeOwned,
    C: Codec,
{
    /// Downgrades a cache failure when the policy allows it.
    fn tolerate(&self, op: &str, key: &str, err: CachierError) -> CachierResult<()> {
        if self.policy.fail_open && err.is_cache_failure() {
            let backend = self.cache.backend();
            warn!(op, key, backend, error = %err, "Cache unavailable; continuing without it");
            Ok(())
        } else {
            Err(err)
        }
    }

    async fn cached<T: DeserializeOwned>(&self, key: &str) -> CachierResult<Option<T>> {
        let raw = match self.cache.get_raw(key).await {
            Ok(raw) => raw,
            Err(e) => {
                self.tolerate("get", key, e)?;
                None
            }
        };

        let Some(raw) = raw else {
            debug!("Cache miss for key '{}'", key);
            return Ok(None);
        };

        match self.codec.decode(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                debug!("Undecodable entry at '{}' treated as a miss: {}", key, e);
                Ok(None)
            }
        }
    }

    async fn populate<T: Serialize>(&self, key: &str, value: &T) -> CachierResult<()> {
        let raw = match self.codec.encode(value) {
            Ok(raw) => raw,
            Err(e) => return self.tolerate("encode", key, e),
        };

        let expires_at = self.clock.expires_in(self.policy.ttl);
        match self.cache.set_raw(key, &raw, expires_at).await {
            Ok(()) => {
                debug!("Populated '{}' until {}", key, expires_at);
                Ok(())
            }
            Err(e) => self.tolerate("set", key, e),
        }
    }

    /// Populates `key` only while `current` holds, and takes the entry back
    /// out if `current` stopped holding during the write.
    async fn publish<T, G>(&self, key: &str, value: &T, current: &G) -> CachierResult<()>
    where
        T: Serialize,
        G: Fn() -> bool,
    {
        if !current() {
            debug!("Discarding stale load for '{}'", key);
            return Ok(());
        }
        self.populate(key, value).await?;
        if !current() {
            debug!("Load for '{}' went stale while writing; evicting", key);
            self.evict(key).await?;
        }
        Ok(())
    }

    async fn evict(&self, key: &str) -> CachierResult<()> {
        match self.cache.delete(key).await {
            Ok(removed) => {
                debug!("Evicted '{}': {}", key, removed);
                Ok(())
            }
            Err(e) => self.tolerate("delete", key, e),
        }
    }

    async fn load_collection<G>(&self, name: &str, current: G) -> CachierResult<Vec<S::Record>>
    where
        G: Fn() -> bool,
    {
        let records = self.store.list_all().await?;
        debug!("Loaded {} records for '{}' from the store", records.len(), name);
        self.publish(name, &records, &current).await?;
        Ok(records)
    }

    async fn load_record<G>(&self, key: &str, id: S::Id, current: G) -> CachierResult<Option<S::Record>>
    where
        G: Fn() -> bool,
    {
        let Some(record) = self.store.find_by_id(id).await? else {
            debug!("No record behind '{}'; nothing cached", key);
            return Ok(None);
        };
        self.publish(key, &record, &current).await?;
        Ok(Some(record))
    }
}

/// Cache-aside orchestrator for one record store.
///
/// Collection reads use the collection name as the key; single records use
/// the name followed directly by the identifier (`customer17`). The
/// orchestrator keeps no state of its own besides the loads in flight.
pub struct CacheAside<S, C = JsonCodec>
where
    S: RecordStore + ?Sized,
{
    backends: Backends<S, C>,
    invalidates: Vec<String>,
    collections: SingleFlight<Vec<S::Record>>,
    records: SingleFlight<Option<S::Record>>,
}

impl<S> CacheAside<S, JsonCodec>
where
    S: RecordStore + ?Sized + 'static,
    S::Record: Serialize + DeserializeOwned,
{
    /// Creates a JSON-encoding orchestrator with the default policy.
    #[must_use]
    pub fn new(store: Arc<S>, cache: Arc<dyn CacheInterface>) -> Self {
        Self::with_codec(store, cache, JsonCodec)
    }
}

impl<S, C> CacheAside<S, C>
where
    S: RecordStore + ?Sized + 'static,
    S::Record: Serialize + DeserializeOwned,
    C: Codec + Clone,
{
    /// Creates an orchestrator encoding entries with `codec`.
    #[must_use]
    pub fn with_codec(store: Arc<S>, cache: Arc<dyn CacheInterface>, codec: C) -> Self {
        Self {
            backends: Backends {
                store,
                cache,
                clock: Arc::new(SystemClock),
                codec,
                policy: CachePolicy::default(),
            },
            invalidates: Vec::new(),
            collections: SingleFlight::new(),
            records: SingleFlight::new(),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.backends.clock = clock;
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: CachePolicy) -> Self {
        self.backends.policy = policy;
        self
    }

    /// Registers a collection key to evict after writes when the policy
    /// enables write invalidation.
    #[must_use]
    pub fn invalidating(mut self, key: impl Into<String>) -> Self {
        self.invalidates.push(key.into());
        self
    }

    #[must_use]
    pub const fn policy(&self) -> &CachePolicy {
        &self.backends.policy
    }

    /// Returns the backing cache.
    #[must_use]
    pub fn cache(&self) -> &Arc<dyn CacheInterface> {
        &self.backends.cache
    }

    /// Returns the backing store.
    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        &self.backends.store
    }

    /// Reads every record, through the cache entry at `name`.
    ///
    /// An empty cached collection counts as a miss.
    pub async fn read_collection(&self, name: &str) -> CachierResult<Vec<S::Record>> {
        if let Some(records) = self.backends.cached::<Vec<S::Record>>(name).await? {
            if !records.is_empty() {
                debug!("Cache hit for '{}' ({} records)", name, records.len());
                return Ok(records);
            }
            debug!("Empty collection at '{}' treated as a miss", name);
        }

        if !self.backends.policy.single_flight {
            return self.backends.load_collection(name, || true).await;
        }

        let backends = self.backends.clone();
        let key = name.to_string();
        self.collections
            .run(name, move |ticket| async move {
                backends.load_collection(&key, || ticket.is_current()).await
            })
            .await
    }

    /// Reads one record, through the cache entry at `{name}{id}`.
    ///
    /// Returns `None` when the store has no such record; absence is not
    /// cached.
    pub async fn read_record(&self, name: &str, id: S::Id) -> CachierResult<Option<S::Record>> {
        let key = cache_keys::record(name, &id);
        if let Some(record) = self.backends.cached::<S::Record>(&key).await? {
            debug!("Cache hit for '{}'", key);
            return Ok(Some(record));
        }

        if !self.backends.policy.single_flight {
            return self.backends.load_record(&key, id, || true).await;
        }

        let backends = self.backends.clone();
        let flight_key = key.clone();
        self.records
            .run(&flight_key, move |ticket| async move {
                backends.load_record(&key, id, || ticket.is_current()).await
            })
            .await
    }

    /// Inserts a record and caches it at `{name}{id}`.
    pub async fn create_record(&self, name: &str, record: S::NewRecord) -> CachierResult<S::Record> {
        let created = self.backends.store.insert(record).await?;
        let key = cache_keys::record(name, created.id());
        self.backends.populate(&key, &created).await?;
        self.invalidate_dependents().await?;
        Ok(created)
    }

    /// Deletes a record and evicts `{name}{id}`.
    ///
    /// When the store has no such record nothing is deleted and the cache is
    /// left untouched. Loads of the record still in flight are detached so
    /// they cannot write the deleted row back.
    pub async fn delete_record(&self, name: &str, id: S::Id) -> CachierResult<bool> {
        let key = cache_keys::record(name, &id);
        if self.backends.store.find_by_id(id.clone()).await?.is_none() {
            debug!("Nothing to delete at '{}'", key);
            return Ok(false);
        }

        let deleted = self.backends.store.delete_by_id(id).await?;
        self.records.forget(&key);
        self.backends.evict(&key).await?;
        self.invalidate_dependents().await?;
        Ok(deleted)
    }

    async fn invalidate_dependents(&self) -> CachierResult<()> {
        if !self.backends.policy.invalidate_collection_on_write {
            return Ok(());
        }
        for key in &self.invalidates {
            self.collections.forget(key);
            self.backends.evict(key).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MemoryCacheService, MockCacheInterface};
    use async_trait::async_trait;
    use cachier_core::{Customer, CustomerId, ManualClock, NewCustomer};
    use parking_lot::Mutex;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const COLLECTION: &str = "customers";
    const RECORD: &str = "customer";

    /// Store that counts queries and can be slowed down or broken.
    #[derive(Default)]
    struct CountingStore {
        rows: Mutex<BTreeMap<CustomerId, Customer>>,
        next_id: Mutex<i64>,
        list_calls: AtomicUsize,
        find_calls: AtomicUsize,
        delete_calls: AtomicUsize,
        delay: Option<Duration>,
        stall_first_find: Option<Duration>,
        broken: bool,
    }

    impl CountingStore {
        fn with_customers(names: &[&str]) -> Self {
            let store = Self::default();
            for (i, name) in names.iter().enumerate() {
                let id = CustomerId(i as i64 + 1);
                store
                    .rows
                    .lock()
                    .insert(id, Customer::new(id, *name, i as i32 * 10));
            }
            *store.next_id.lock() = names.len() as i64;
            store
        }

        fn slow(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        /// Makes the first lookup read its row and then hang for `delay`.
        fn stall_first_find(mut self, delay: Duration) -> Self {
            self.stall_first_find = Some(delay);
            self
        }

        fn contains(&self, id: CustomerId) -> bool {
            self.rows.lock().contains_key(&id)
        }

        fn broken() -> Self {
            Self {
                broken: true,
                ..Self::default()
            }
        }

        fn lists(&self) -> usize {
            self.list_calls.load(Ordering::SeqCst)
        }

        fn finds(&self) -> usize {
            self.find_calls.load(Ordering::SeqCst)
        }

        async fn pause(&self) -> CachierResult<()> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.broken {
                return Err(CachierError::Database("connection refused".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl RecordStore for CountingStore {
        type Record = Customer;
        type Id = CustomerId;
        type NewRecord = NewCustomer;

        async fn list_all(&self) -> CachierResult<Vec<Customer>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            self.pause().await?;
            Ok(self.rows.lock().values().cloned().collect())
        }

        async fn insert(&self, record: NewCustomer) -> CachierResult<Customer> {
            self.pause().await?;
            let mut next = self.next_id.lock();
            *next += 1;
            let created = record.with_id(CustomerId(*next));
            self.rows.lock().insert(created.id, created.clone());
            Ok(created)
        }

        async fn find_by_id(&self, id: CustomerId) -> CachierResult<Option<Customer>> {
            let call = self.find_calls.fetch_add(1, Ordering::SeqCst);
            self.pause().await?;
            let row = self.rows.lock().get(&id).cloned();
            if let (0, Some(stall)) = (call, self.stall_first_find) {
                tokio::time::sleep(stall).await;
            }
            Ok(row)
        }

        async fn delete_by_id(&self, id: CustomerId) -> CachierResult<bool> {
            self.delete_calls.fetch_add(1, Ordering::SeqCst);
            self.pause().await?;
            Ok(self.rows.lock().remove(&id).is_some())
        }
    }

    struct Fixture {
        store: Arc<CountingStore>,
        cache: Arc<MemoryCacheService>,
        clock: ManualClock,
        aside: CacheAside<CountingStore>,
    }

    fn fixture(store: CountingStore, policy: CachePolicy) -> Fixture {
        let clock = ManualClock::default();
        let store = Arc::new(store);
        let cache = Arc::new(MemoryCacheService::with_clock(Arc::new(clock.clone())));
        let aside = CacheAside::new(Arc::clone(&store), cache.clone() as Arc<dyn CacheInterface>)
            .with_clock(Arc::new(clock.clone()))
            .with_policy(policy)
            .invalidating(COLLECTION);
        Fixture {
            store,
            cache,
            clock,
            aside,
        }
    }

    fn failing_cache() -> MockCacheInterface {
        let mut cache = MockCacheInterface::new();
        cache
            .expect_get_raw()
            .returning(|_| Err(CachierError::cache("connection refused")));
        cache
            .expect_set_raw()
            .returning(|_, _, _| Err(CachierError::cache("connection refused")));
        cache
            .expect_delete()
            .returning(|_| Err(CachierError::cache("connection refused")));
        cache.expect_backend().return_const("redis");
        cache
    }

    #[tokio::test]
    async fn test_cold_read_then_hit_then_expiry() {
        let f = fixture(
            CountingStore::with_customers(&["Acme", "Globex", "Initech"]),
            CachePolicy::default(),
        );

        let first = f.aside.read_collection(COLLECTION).await.unwrap();
        assert_eq!(first.len(), 3);
        assert_eq!(first, f.store.list_all().await.unwrap());
        assert_eq!(f.store.lists(), 2);
        assert!(f.cache.get_raw(COLLECTION).await.unwrap().is_some());

        let second = f.aside.read_collection(COLLECTION).await.unwrap();
        assert_eq!(second, first);
        assert_eq!(f.store.lists(), 2);

        f.clock.advance(Duration::from_secs(46));
        let third = f.aside.read_collection(COLLECTION).await.unwrap();
        assert_eq!(third, first);
        assert_eq!(f.store.lists(), 3);
    }

    #[tokio::test]
    async fn test_entry_expires_at_now_plus_ttl() {
        let f = fixture(CountingStore::with_customers(&["Acme"]), CachePolicy::default());
        let start = f.clock.now();

        f.aside.read_collection(COLLECTION).await.unwrap();

        let expected = start + chrono::Duration::seconds(45);
        assert_eq!(f.cache.expires_at(COLLECTION), Some(expected));
    }

    #[tokio::test]
    async fn test_create_then_read_within_ttl() {
        let f = fixture(CountingStore::default(), CachePolicy::default());

        let created = f
            .aside
            .create_record(RECORD, NewCustomer::new("Umbrella", 5))
            .await
            .unwrap();
        assert!(f.cache.exists(&format!("customer{}", created.id)).await.unwrap());

        let read = f.aside.read_record(RECORD, created.id).await.unwrap();
        assert_eq!(read, Some(created));
        assert_eq!(f.store.finds(), 0);
    }

    #[tokio::test]
    async fn test_read_record_absent_is_not_cached() {
        let f = fixture(CountingStore::default(), CachePolicy::default());

        assert!(f.aside.read_record(RECORD, CustomerId(9)).await.unwrap().is_none());
        assert!(f.aside.read_record(RECORD, CustomerId(9)).await.unwrap().is_none());
        assert_eq!(f.store.finds(), 2);
        assert!(f.cache.is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_touches_no_cache() {
        let store = Arc::new(CountingStore::default());
        // No expectations: any cache call fails the test.
        let cache: Arc<dyn CacheInterface> = Arc::new(MockCacheInterface::new());
        let aside = CacheAside::new(Arc::clone(&store), cache);

        assert!(!aside.delete_record(RECORD, CustomerId(42)).await.unwrap());
        assert_eq!(store.delete_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_delete_existing_then_read_misses() {
        let f = fixture(CountingStore::with_customers(&["Acme"]), CachePolicy::default());
        let id = CustomerId(1);

        assert!(f.aside.read_record(RECORD, id).await.unwrap().is_some());
        assert!(f.cache.exists("customer1").await.unwrap());

        assert!(f.aside.delete_record(RECORD, id).await.unwrap());
        assert!(!f.cache.exists("customer1").await.unwrap());
        assert!(f.aside.read_record(RECORD, id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cancelled_read_cannot_restore_deleted_record() {
        let f = fixture(
            CountingStore::with_customers(&["Acme"]).stall_first_find(Duration::from_millis(50)),
            CachePolicy::default(),
        );
        let id = CustomerId(1);

        let cancelled =
            tokio::time::timeout(Duration::from_millis(5), f.aside.read_record(RECORD, id)).await;
        assert!(cancelled.is_err());

        assert!(f.aside.delete_record(RECORD, id).await.unwrap());
        assert!(f.aside.read_record(RECORD, id).await.unwrap().is_none());

        // Let the detached load finish; it must not write the row back.
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!f.cache.exists("customer1").await.unwrap());
        assert!(f.aside.read_record(RECORD, id).await.unwrap().is_none());
        assert_eq!(f.aside.records.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_read_still_warms_cache() {
        let f = fixture(
            CountingStore::with_customers(&["Acme"]).stall_first_find(Duration::from_millis(20)),
            CachePolicy::default(),
        );
        let id = CustomerId(1);

        let cancelled =
            tokio::time::timeout(Duration::from_millis(5), f.aside.read_record(RECORD, id)).await;
        assert!(cancelled.is_err());

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(f.cache.exists("customer1").await.unwrap());
        assert_eq!(f.aside.records.in_flight(), 0);

        assert!(f.aside.read_record(RECORD, id).await.unwrap().is_some());
        assert_eq!(f.store.finds(), 1);
    }

    #[tokio::test]
    async fn test_parallel_cold_reads_share_one_load() {
        let f = fixture(
            CountingStore::with_customers(&["Acme", "Globex"]).slow(Duration::from_millis(20)),
            CachePolicy::default(),
        );

        let reads = (0..16).map(|_| f.aside.read_collection(COLLECTION));
        let results = futures::future::join_all(reads).await;

        assert!(results.iter().all(|r| r.as_ref().is_ok_and(|v| v.len() == 2)));
        assert_eq!(f.store.lists(), 1);
        let cached: Vec<Customer> =
            JsonCodec.decode(&f.cache.get_raw(COLLECTION).await.unwrap().unwrap()).unwrap();
        assert_eq!(cached.len(), 2);
    }

    #[tokio::test]
    async fn test_parallel_cold_reads_without_single_flight() {
        let policy = CachePolicy {
            single_flight: false,
            ..CachePolicy::default()
        };
        let f = fixture(
            CountingStore::with_customers(&["Acme"]).slow(Duration::from_millis(20)),
            policy,
        );

        let reads = (0..4).map(|_| f.aside.read_collection(COLLECTION));
        let results = futures::future::join_all(reads).await;

        assert!(results.iter().all(Result::is_ok));
        assert_eq!(f.store.lists(), 4);
        assert!(f.cache.exists(COLLECTION).await.unwrap());
    }

    #[tokio::test]
    async fn test_empty_collection_is_a_miss() {
        let f = fixture(CountingStore::default(), CachePolicy::default());

        assert!(f.aside.read_collection(COLLECTION).await.unwrap().is_empty());
        assert_eq!(f.cache.get_raw(COLLECTION).await.unwrap().as_deref(), Some("[]"));

        assert!(f.aside.read_collection(COLLECTION).await.unwrap().is_empty());
        assert_eq!(f.store.lists(), 2);
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_a_miss() {
        let f = fixture(CountingStore::with_customers(&["Acme"]), CachePolicy::default());
        let expires = f.clock.expires_in(Duration::from_secs(45));
        f.cache.set_raw(COLLECTION, "{\"trunc", expires).await.unwrap();

        let records = f.aside.read_collection(COLLECTION).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(f.store.lists(), 1);

        let repaired: Vec<Customer> =
            JsonCodec.decode(&f.cache.get_raw(COLLECTION).await.unwrap().unwrap()).unwrap();
        assert_eq!(repaired, records);
    }

    #[tokio::test]
    async fn test_undecodable_record_entry_is_a_miss() {
        let f = fixture(CountingStore::with_customers(&["Acme"]), CachePolicy::default());
        let expires = f.clock.expires_in(Duration::from_secs(45));
        f.cache.set_raw("customer1", "not json", expires).await.unwrap();

        let record = f.aside.read_record(RECORD, CustomerId(1)).await.unwrap();
        assert_eq!(record.as_ref().map(|c| c.customer_name.as_str()), Some("Acme"));
        assert_eq!(f.store.finds(), 1);

        let repaired: Customer =
            JsonCodec.decode(&f.cache.get_raw("customer1").await.unwrap().unwrap()).unwrap();
        assert_eq!(Some(repaired), record);
    }

    #[tokio::test]
    async fn test_fail_open_falls_back_to_store() {
        let store = Arc::new(CountingStore::with_customers(&["Acme", "Globex"]));
        let aside = CacheAside::new(Arc::clone(&store), Arc::new(failing_cache()) as Arc<dyn CacheInterface>);

        assert_eq!(aside.read_collection(COLLECTION).await.unwrap().len(), 2);
        assert!(aside.read_record(RECORD, CustomerId(1)).await.unwrap().is_some());
        let created = aside
            .create_record(RECORD, NewCustomer::new("Initech", 3))
            .await
            .unwrap();
        assert!(aside.delete_record(RECORD, created.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_fail_closed_propagates_cache_errors() {
        let store = Arc::new(CountingStore::with_customers(&["Acme"]));
        let aside = CacheAside::new(Arc::clone(&store), Arc::new(failing_cache()) as Arc<dyn CacheInterface>)
            .with_policy(CachePolicy {
                fail_open: false,
                ..CachePolicy::default()
            });

        let err = aside.read_collection(COLLECTION).await.unwrap_err();
        assert!(matches!(err, CachierError::Cache(_)));
        assert_eq!(store.lists(), 0);
    }

    #[tokio::test]
    async fn test_fail_closed_delete_reports_eviction_failure() {
        let store = Arc::new(CountingStore::with_customers(&["Acme"]));
        let aside = CacheAside::new(Arc::clone(&store), Arc::new(failing_cache()) as Arc<dyn CacheInterface>)
            .with_policy(CachePolicy {
                fail_open: false,
                ..CachePolicy::default()
            });

        let err = aside.delete_record(RECORD, CustomerId(1)).await.unwrap_err();
        assert!(matches!(err, CachierError::Cache(_)));
        assert!(!store.contains(CustomerId(1)));
        assert_eq!(store.delete_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_store_errors_propagate() {
        let f = fixture(CountingStore::broken(), CachePolicy::default());

        let err = f.aside.read_collection(COLLECTION).await.unwrap_err();
        assert!(matches!(err, CachierError::Database(_)));
        assert!(f.cache.is_empty());

        let err = f
            .aside
            .create_record(RECORD, NewCustomer::new("Acme", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, CachierError::Database(_)));
    }

    #[tokio::test]
    async fn test_create_leaves_collection_stale_by_default() {
        let f = fixture(CountingStore::with_customers(&["Acme"]), CachePolicy::default());

        f.aside.read_collection(COLLECTION).await.unwrap();
        f.aside
            .create_record(RECORD, NewCustomer::new("Globex", 2))
            .await
            .unwrap();

        assert_eq!(f.aside.read_collection(COLLECTION).await.unwrap().len(), 1);
        assert_eq!(f.store.lists(), 1);
    }

    #[tokio::test]
    async fn test_invalidate_collection_on_write() {
        let policy = CachePolicy {
            invalidate_collection_on_write: true,
            ..CachePolicy::default()
        };
        let f = fixture(CountingStore::with_customers(&["Acme"]), policy);

        f.aside.read_collection(COLLECTION).await.unwrap();
        let created = f
            .aside
            .create_record(RECORD, NewCustomer::new("Globex", 2))
            .await
            .unwrap();
        assert!(!f.cache.exists(COLLECTION).await.unwrap());
        assert_eq!(f.aside.read_collection(COLLECTION).await.unwrap().len(), 2);

        assert!(f.aside.delete_record(RECORD, created.id).await.unwrap());
        assert!(!f.cache.exists(COLLECTION).await.unwrap());
        assert_eq!(f.store.lists(), 2);
    }

    #[test]
    fn test_policy_from_config() {
        let config = CacheConfig {
            ttl_secs: 10,
            fail_open: false,
            single_flight: false,
            invalidate_collection_on_write: true,
            ..CacheConfig::default()
        };
        let policy = CachePolicy::from_config(&config);
        assert_eq!(policy.ttl, Duration::from_secs(10));
        assert!(!policy.fail_open);
        assert!(!policy.single_flight);
        assert!(policy.invalidate_collection_on_write);
        assert_eq!(CachePolicy::default().ttl, Duration::from_secs(45));
    }
}
