//! Customer-related DTOs.

use cachier_core::NewCustomer;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Request to create a new customer.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerRequest {
    #[validate(length(min = 3, max = 250, message = "Customer name must be 3-250 characters"))]
    pub customer_name: String,

    pub customer_no: i32,
}

impl From<CreateCustomerRequest> for NewCustomer {
    fn from(request: CreateCustomerRequest) -> Self {
        Self::new(request.customer_name, request.customer_no)
    }
}

/// Number of stored customers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct CustomerCountResponse {
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use cachier_core::ValidateExt;

    #[test]
    fn test_request_reads_camel_case() {
        let request: CreateCustomerRequest =
            serde_json::from_str(r#"{"customerName":"Acme","customerNo":42}"#).unwrap();
        assert_eq!(request.customer_name, "Acme");
        assert_eq!(request.customer_no, 42);
    }

    #[test]
    fn test_name_length_bounds() {
        let ok = |name: &str| {
            CreateCustomerRequest {
                customer_name: name.to_string(),
                customer_no: 1,
            }
            .validate_request()
            .is_ok()
        };

        assert!(!ok("ab"));
        assert!(ok("abc"));
        assert!(ok(&"x".repeat(250)));
        assert!(!ok(&"x".repeat(251)));
    }

    #[test]
    fn test_into_new_customer() {
        let new: NewCustomer = CreateCustomerRequest {
            customer_name: "Globex".to_string(),
            customer_no: 7,
        }
        .into();
        assert_eq!(new, NewCustomer::new("Globex", 7));
    }
}
