//! Repository trait definitions.

use cachier_core::{CachierResult, Customer, CustomerId, Entity, Interface, NewCustomer};
use async_trait::async_trait;
use std::fmt::Display;

/// Persisted CRUD over one kind of record.
///
/// The cache-aside layer talks to the store only through this trait. A
/// missing record is `Ok(None)` or `Ok(false)`; errors are store failures
/// and are never retried here.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// The persisted record type.
    type Record: Entity<Self::Id> + Clone + Send + Sync + 'static;
    /// Store-generated identifier.
    type Id: Display + Clone + Send + Sync + 'static;
    /// Input to `insert`, without an identifier.
    type NewRecord: Send + 'static;

    /// Returns every record; empty when there are none.
    async fn list_all(&self) -> CachierResult<Vec<Self::Record>>;

    /// Persists a record and returns it with its generated identifier.
    async fn insert(&self, record: Self::NewRecord) -> CachierResult<Self::Record>;

    /// Finds a record by identifier.
    async fn find_by_id(&self, id: Self::Id) -> CachierResult<Option<Self::Record>>;

    /// Deletes a record, returning whether a row was removed.
    async fn delete_by_id(&self, id: Self::Id) -> CachierResult<bool>;
}

/// Customer repository trait.
#[async_trait]
pub trait CustomerRepository:
    RecordStore<Record = Customer, Id = CustomerId, NewRecord = NewCustomer> + Interface
{
    /// Counts all customers.
    async fn count(&self) -> CachierResult<u64>;
}
