//! Collapsing of concurrent loads for the same key.

use cachier_core::{CachierError, CachierResult};
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

type SharedLoad<V> = Shared<BoxFuture<'static, Result<V, Arc<CachierError>>>>;

struct Flight<V> {
    id: u64,
    load: SharedLoad<V>,
}

type Registry<V> = Arc<Mutex<HashMap<String, Flight<V>>>>;

/// Registry of loads currently running, keyed by cache key.
///
/// The first caller for a key spawns its load as a task; callers arriving
/// while it runs await the same task and receive a copy of its result.
/// The task deregisters itself when it finishes, whether or not anyone is
/// still waiting. Dropping a caller abandons only that caller's wait.
pub struct SingleFlight<V> {
    inflight: Registry<V>,
    next_id: AtomicU64,
}

/// Handed to a load so it can tell whether its key was forgotten while it
/// ran. A forgotten load must not publish what it read.
pub struct Ticket<V> {
    registry: Registry<V>,
    key: String,
    id: u64,
}

impl<V> Ticket<V> {
    /// True while this load is still the registered one for its key.
    #[must_use]
    pub fn is_current(&self) -> bool {
        self.registry
            .lock()
            .get(&self.key)
            .is_some_and(|flight| flight.id == self.id)
    }
}

impl<V> SingleFlight<V>
where
    V: Clone + Send + Sync + 'static,
{
    #[must_use]
    pub fn new() -> Self {
        Self {
            inflight: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(0),
        }
    }

    /// Runs the load built by `make_load` unless a load for `key` is
    /// already in flight, in which case that load's result is returned.
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn run<F, Fut>(&self, key: &str, make_load: F) -> CachierResult<V>
    where
        F: FnOnce(Ticket<V>) -> Fut,
        Fut: Future<Output = CachierResult<V>> + Send + 'static,
    {
        let shared = {
            let mut inflight = self.inflight.lock();
            if let Some(existing) = inflight.get(key) {
                debug!("Joining in-flight load for key '{}'", key);
                existing.load.clone()
            } else {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                let load = make_load(Ticket {
                    registry: Arc::clone(&self.inflight),
                    key: key.to_string(),
                    id,
                });
                let shared = spawn_load(Arc::clone(&self.inflight), key.to_string(), id, load);
                inflight.insert(
                    key.to_string(),
                    Flight {
                        id,
                        load: shared.clone(),
                    },
                );
                shared
            }
        };

        shared.await.map_err(|e| e.replicate())
    }

    /// Detaches the load in flight for `key`, if any.
    ///
    /// The detached load keeps running for its current waiters, but its
    /// [`Ticket`] stops being current and later callers start afresh.
    pub fn forget(&self, key: &str) -> bool {
        let forgotten = self.inflight.lock().remove(key).is_some();
        if forgotten {
            debug!("Forgot in-flight load for key '{}'", key);
        }
        forgotten
    }

    /// Number of loads currently registered.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.inflight.lock().len()
    }
}

impl<V> Default for SingleFlight<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

fn spawn_load<V, Fut>(registry: Registry<V>, key: String, id: u64, load: Fut) -> SharedLoad<V>
where
    V: Clone + Send + Sync + 'static,
    Fut: Future<Output = CachierResult<V>> + Send + 'static,
{
    // The caller holds the registry lock, so the task cannot deregister
    // before its entry is inserted.
    let task = tokio::spawn(async move {
        let result = load.await.map_err(Arc::new);
        let mut inflight = registry.lock();
        if inflight.get(&key).is_some_and(|flight| flight.id == id) {
            inflight.remove(&key);
        }
        result
    });

    async move {
        match task.await {
            Ok(result) => result,
            Err(e) => Err(Arc::new(CachierError::internal(format!("Load task failed: {e}")))),
        }
    }
    .boxed()
    .shared()
}
