//! MySQL customer repository implementation.

use crate::{CustomerRepository, DatabasePoolInterface, RecordStore};
use cachier_core::{CachierError, CachierResult, Customer, CustomerId, NewCustomer};
use async_trait::async_trait;
use shaku::Component;
use sqlx::FromRow;
use std::sync::Arc;
use tracing::debug;

/// MySQL customer repository implementation.
#[derive(Component, Clone)]
#[shaku(interface = CustomerRepository)]
pub struct MySqlCustomerRepository {
    #[shaku(inject)]
    pool: Arc<dyn DatabasePoolInterface>,
}

impl MySqlCustomerRepository {
    /// Creates a new MySQL customer repository.
    #[must_use]
    pub fn new(pool: Arc<dyn DatabasePoolInterface>) -> Self {
        Self { pool }
    }
}

/// Database row representation of a customer.
#[derive(Debug, FromRow)]
struct CustomerRow {
    id: i64,
    customer_name: String,
    customer_no: i32,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Customer::new(CustomerId(row.id), row.customer_name, row.customer_no)
    }
}

#[async_trait]
impl RecordStore for MySqlCustomerRepository {
    type Record = Customer;
    type Id = CustomerId;
    type NewRecord = NewCustomer;

    async fn list_all(&self) -> CachierResult<Vec<Customer>> {
        debug!("Listing all customers");

        let rows = sqlx::query_as::<_, CustomerRow>(
            "SELECT id, customer_name, customer_no FROM customers ORDER BY id",
        )
        .fetch_all(self.pool.inner())
        .await?;

        Ok(rows.into_iter().map(Customer::from).collect())
    }

    async fn insert(&self, customer: NewCustomer) -> CachierResult<Customer> {
        debug!("Inserting customer: {}", customer.customer_name);

        let result = sqlx::query("INSERT INTO customers (customer_name, customer_no) VALUES (?, ?)")
            .bind(&customer.customer_name)
            .bind(customer.customer_no)
            .execute(self.pool.inner())
            .await?;

        let id = i64::try_from(result.last_insert_id())
            .map_err(|e| CachierError::Internal(format!("Generated id out of range: {e}")))?;

        Ok(customer.with_id(CustomerId(id)))
    }

    async fn find_by_id(&self, id: CustomerId) -> CachierResult<Option<Customer>> {
        debug!("Finding customer by id: {}", id);

        let row = sqlx::query_as::<_, CustomerRow>(
            "SELECT id, customer_name, customer_no FROM customers WHERE id = ?",
        )
        .bind(id.into_inner())
        .fetch_optional(self.pool.inner())
        .await?;

        Ok(row.map(Customer::from))
    }

    async fn delete_by_id(&self, id: CustomerId) -> CachierResult<bool> {
        debug!("Deleting customer: {}", id);

        let result = sqlx::query("DELETE FROM customers WHERE id = ?")
            .bind(id.into_inner())
            .execute(self.pool.inner())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl CustomerRepository for MySqlCustomerRepository {
    async fn count(&self) -> CachierResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(self.pool.inner())
            .await?;

        Ok(u64::try_from(count).unwrap_or_default())
    }
}

impl std::fmt::Debug for MySqlCustomerRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlCustomerRepository").finish_non_exhaustive()
    }
}
