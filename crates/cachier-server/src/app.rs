//! Application assembly.

use crate::di::{build_local_module, build_redis_module, RedisConnections};
use cachier_config::AppConfig;
use cachier_core::{CachierError, CachierResult, HasComponent};
use cachier_repository::{DatabasePool, DatabasePoolInterface};
use cachier_rest::{create_router, AppState};
use cachier_service::{
    CustomerService, DataStructureService, MemoryCacheService, RedisCacheService,
};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// A wired application ready to serve.
pub struct App {
    router: Router,
    database: DatabasePool,
    housekeeping: Option<JoinHandle<()>>,
}

impl App {
    /// Opens the shared connections and wires every layer.
    pub async fn build(config: &AppConfig) -> CachierResult<Self> {
        let database = DatabasePool::connect(&config.database).await?;
        if config.database.run_migrations {
            database.run_migrations().await?;
        }

        let mut housekeeping = None;
        let state = if config.redis.enabled {
            let redis = RedisConnections::open(&config.redis)?;
            let module = build_redis_module(&database, &redis, &config.cache);

            let customers: Arc<dyn CustomerService> = module.resolve();
            let data_structures: Arc<dyn DataStructureService> = module.resolve();

            AppState::new(customers)
                .with_data_structures(data_structures)
                .with_health_check(Arc::new(database.clone()))
                .with_health_check(Arc::new(RedisCacheService::new(redis.pool)))
        } else {
            info!("Redis disabled; using the in-process cache");
            let memory = MemoryCacheService::new();
            let module = build_local_module(&database, &memory, &config.cache);

            housekeeping = Some(spawn_purge_task(memory.clone(), config.cache.purge_interval()));

            let customers: Arc<dyn CustomerService> = module.resolve();
            AppState::new(customers)
                .with_health_check(Arc::new(database.clone()))
                .with_health_check(Arc::new(memory))
        };

        Ok(Self {
            router: create_router(state, &config.server),
            database,
            housekeeping,
        })
    }

    /// Serves until `shutdown` resolves, then releases the connections.
    pub async fn serve<F>(self, addr: &str, shutdown: F) -> CachierResult<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| CachierError::Internal(format!("Failed to bind REST: {e}")))?;

        info!("Starting REST server on http://{}", addr);

        let served = axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| CachierError::Internal(format!("REST server error: {e}")));

        if let Some(task) = self.housekeeping {
            task.abort();
        }
        self.database.close().await;

        served
    }
}

/// Periodically drops expired entries from the in-process cache.
pub fn spawn_purge_task(cache: MemoryCacheService, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Starting cache purge task every {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.purge_expired();
            if removed > 0 {
                debug!("Purged {} expired cache entries", removed);
            }
        }
    })
}
