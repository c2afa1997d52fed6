//! Typed ID wrappers for domain entities.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::num::ParseIntError;

/// A strongly-typed wrapper for customer IDs.
///
/// Identifiers are generated by the record store on insert; the wrapper
/// serializes as a bare integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(transparent)]
pub struct CustomerId(pub i64);

impl CustomerId {
    /// Creates a customer ID from a raw integer.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Parses a customer ID from a string.
    pub fn parse(s: &str) -> Result<Self, ParseIntError> {
        Ok(Self(s.trim().parse()?))
    }

    /// Returns the inner integer.
    #[must_use]
    pub const fn into_inner(self) -> i64 {
        self.0
    }
}

impl Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for CustomerId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<CustomerId> for i64 {
    fn from(id: CustomerId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_id_display() {
        assert_eq!(CustomerId::new(42).to_string(), "42");
    }

    #[test]
    fn test_customer_id_parsing() {
        assert_eq!(CustomerId::parse("17").unwrap(), CustomerId(17));
        assert_eq!(CustomerId::parse(" 17 ").unwrap(), CustomerId(17));
        assert!(CustomerId::parse("abc").is_err());
    }

    #[test]
    fn test_customer_id_serializes_as_integer() {
        let json = serde_json::to_string(&CustomerId(7)).unwrap();
        assert_eq!(json, "7");
        let back: CustomerId = serde_json::from_str("7").unwrap();
        assert_eq!(back, CustomerId(7));
    }
}
