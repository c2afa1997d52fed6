//! Customer entity.

use crate::{CustomerId, Entity};
use serde::{Deserialize, Serialize};

/// Minimum length of a customer name, in characters.
pub const CUSTOMER_NAME_MIN_LEN: u64 = 3;

/// Maximum length of a customer name, in characters.
pub const CUSTOMER_NAME_MAX_LEN: u64 = 250;

/// A persisted customer record.
///
/// This is also the cached shape: the same JSON document is written to the
/// key-value cache for single records and, as an array, for collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// Store-generated identifier.
    pub id: CustomerId,

    /// Display name (3-250 characters).
    pub customer_name: String,

    /// Business customer number.
    pub customer_no: i32,
}

impl Customer {
    /// Creates a customer with an already-assigned identifier.
    #[must_use]
    pub fn new(id: CustomerId, customer_name: impl Into<String>, customer_no: i32) -> Self {
        Self {
            id,
            customer_name: customer_name.into(),
            customer_no,
        }
    }
}

impl Entity<CustomerId> for Customer {
    fn id(&self) -> &CustomerId {
        &self.id
    }
}

/// A customer that has not been persisted yet and therefore has no identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
    pub customer_name: String,
    pub customer_no: i32,
}

impl NewCustomer {
    #[must_use]
    pub fn new(customer_name: impl Into<String>, customer_no: i32) -> Self {
        Self {
            customer_name: customer_name.into(),
            customer_no,
        }
    }

    /// Attaches the store-assigned identifier.
    #[must_use]
    pub fn with_id(self, id: CustomerId) -> Customer {
        Customer {
            id,
            customer_name: self.customer_name,
            customer_no: self.customer_no,
        }
    }
}
