//! Customer service trait definition.

use crate::dto::CreateCustomerRequest;
use cachier_core::{CachierResult, Customer, CustomerId, Interface};
use async_trait::async_trait;

/// Customer service trait.
///
/// Reads go through the cache; an absent customer is `None` here and only
/// becomes a 404 at the HTTP edge.
#[async_trait]
pub trait CustomerService: Interface + Send + Sync {
    /// Lists all customers.
    async fn list_customers(&self) -> CachierResult<Vec<Customer>>;

    /// Gets a customer by ID.
    async fn get_customer(&self, id: CustomerId) -> CachierResult<Option<Customer>>;

    /// Creates a new customer.
    async fn create_customer(&self, request: CreateCustomerRequest) -> CachierResult<Customer>;

    /// Deletes a customer, returning whether it existed.
    async fn delete_customer(&self, id: CustomerId) -> CachierResult<bool>;

    /// Counts stored customers, bypassing the cache.
    async fn count_customers(&self) -> CachierResult<u64>;
}
