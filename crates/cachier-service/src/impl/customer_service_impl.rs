//! Customer service implementation.

use crate::cache::{cache_keys, CacheAside, CacheInterface, CachePolicy};
use crate::customer_service::CustomerService;
use crate::dto::CreateCustomerRequest;
use cachier_core::{CachierResult, Clock, Customer, CustomerId, SystemClock, ValidateExt};
use cachier_repository::CustomerRepository;
use async_trait::async_trait;
use shaku::{Component, HasComponent, Module, ModuleBuildContext};
use std::sync::Arc;
use tracing::{debug, info};

/// Customer service backed by a cache-aside orchestrator.
///
/// The collection lives at `customers` and single records at
/// `customer{id}`, both for the policy's TTL.
pub struct CustomerServiceImpl<R: CustomerRepository + ?Sized = dyn CustomerRepository> {
    customers: CacheAside<R>,
}

impl<R: CustomerRepository + ?Sized + 'static> CustomerServiceImpl<R> {
    /// Creates a new customer service.
    pub fn new(
        repository: Arc<R>,
        cache: Arc<dyn CacheInterface>,
        clock: Arc<dyn Clock>,
        policy: CachePolicy,
    ) -> Self {
        let customers = CacheAside::new(repository, cache)
            .with_clock(clock)
            .with_policy(policy)
            .invalidating(cache_keys::CUSTOMERS);
        Self { customers }
    }
}

#[async_trait]
impl<R: CustomerRepository + ?Sized + 'static> CustomerService for CustomerServiceImpl<R> {
    async fn list_customers(&self) -> CachierResult<Vec<Customer>> {
        debug!("Listing customers");
        self.customers.read_collection(cache_keys::CUSTOMERS).await
    }

    async fn get_customer(&self, id: CustomerId) -> CachierResult<Option<Customer>> {
        debug!("Getting customer: {}", id);
        self.customers.read_record(cache_keys::CUSTOMER, id).await
    }

    async fn create_customer(&self, request: CreateCustomerRequest) -> CachierResult<Customer> {
        debug!("Creating customer: {}", request.customer_name);

        request.validate_request()?;

        let created = self
            .customers
            .create_record(cache_keys::CUSTOMER, request.into())
            .await?;

        info!("Customer created: {}", created.id);
        Ok(created)
    }

    async fn delete_customer(&self, id: CustomerId) -> CachierResult<bool> {
        debug!("Deleting customer: {}", id);

        let deleted = self.customers.delete_record(cache_keys::CUSTOMER, id).await?;
        if deleted {
            info!("Customer deleted: {}", id);
        }
        Ok(deleted)
    }

    async fn count_customers(&self) -> CachierResult<u64> {
        self.customers.store().count().await
    }
}

impl<R: CustomerRepository + ?Sized> std::fmt::Debug for CustomerServiceImpl<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomerServiceImpl").finish_non_exhaustive()
    }
}

/// Shaku parameters for [`CustomerServiceImpl`].
#[derive(Debug, Default)]
pub struct CustomerServiceParameters {
    pub policy: CachePolicy,
}

/// Builds the service from the module's repository and cache.
///
/// Written by hand because the orchestrator is assembled from the injected
/// components rather than injected itself.
impl<M> Component<M> for CustomerServiceImpl
where
    M: Module + HasComponent<dyn CustomerRepository> + HasComponent<dyn CacheInterface>,
{
    type Interface = dyn CustomerService;
    type Parameters = CustomerServiceParameters;

    fn build(context: &mut ModuleBuildContext<M>, params: Self::Parameters) -> Box<Self::Interface> {
        let repository = <M as HasComponent<dyn CustomerRepository>>::build_component(context);
        let cache = <M as HasComponent<dyn CacheInterface>>::build_component(context);
        Box::new(Self::new(repository, cache, Arc::new(SystemClock), params.policy))
    }
}
