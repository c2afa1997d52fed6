//! Cache key generators for consistent key naming.
//!
//! Keys are unprefixed so existing deployments keep hitting the same entries.

/// Key of the cached customer collection.
pub const CUSTOMERS: &str = "customers";

/// Prefix of single-customer keys; the id is appended directly.
pub const CUSTOMER: &str = "customer";

/// Builds a single-record key as `{prefix}{id}`.
#[must_use]
pub fn record(prefix: &str, id: impl std::fmt::Display) -> String {
    format!("{prefix}{id}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use cachier_core::CustomerId;

    #[test]
    fn test_record_key_appends_id() {
        assert_eq!(record(CUSTOMER, CustomerId(17)), "customer17");
    }

    #[test]
    fn test_collection_key() {
        assert_eq!(CUSTOMERS, "customers");
    }
}
