//! OpenAPI documentation configuration.

use crate::controllers::{ComponentHealth, HealthResponse, ReadinessResponse};
use cachier_core::{Customer, CustomerId, ErrorResponse, FieldError};
use cachier_service::{
    AddedResponse, CountResponse, CreateCustomerRequest, CustomerCountResponse, ExistsResponse,
    HyperLogLogRequest, MessageResponse, PublishResponse, TransactionOp, TransactionRequest,
};
use utoipa::OpenApi;

/// OpenAPI documentation for the Cachier API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Cachier API",
        version = "1.0.0",
        description = "Cache-aside customer records and Redis data structures",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Customer endpoints
        crate::controllers::customer_controller::list_customers,
        crate::controllers::customer_controller::create_customer,
        crate::controllers::customer_controller::get_customer,
        crate::controllers::customer_controller::delete_customer,
        crate::controllers::customer_controller::count_customers,
        // Data-structure endpoints
        crate::controllers::cache_controller::set_string,
        crate::controllers::cache_controller::get_string,
        crate::controllers::cache_controller::remove_string,
        crate::controllers::cache_controller::set_hash_field,
        crate::controllers::cache_controller::get_hash_field,
        crate::controllers::cache_controller::remove_hash_field,
        crate::controllers::cache_controller::get_all_hash_fields,
        crate::controllers::cache_controller::add_to_list,
        crate::controllers::cache_controller::get_list,
        crate::controllers::cache_controller::remove_from_list,
        crate::controllers::cache_controller::add_to_set,
        crate::controllers::cache_controller::get_set_members,
        crate::controllers::cache_controller::remove_from_set,
        crate::controllers::cache_controller::add_to_sorted_set,
        crate::controllers::cache_controller::get_sorted_set_range,
        crate::controllers::cache_controller::remove_from_sorted_set,
        crate::controllers::cache_controller::add_to_hyperloglog,
        crate::controllers::cache_controller::get_hyperloglog_count,
        crate::controllers::cache_controller::execute_transaction,
        crate::controllers::cache_controller::subscribe,
        crate::controllers::cache_controller::unsubscribe,
        crate::controllers::cache_controller::subscriptions,
        crate::controllers::cache_controller::publish,
        crate::controllers::cache_controller::key_exists,
        crate::controllers::cache_controller::remove_data,
        // Health endpoints
        crate::controllers::health_controller::health_check,
        crate::controllers::health_controller::readiness_check,
        crate::controllers::health_controller::liveness_check,
    ),
    components(
        schemas(
            // Core types
            Customer,
            CustomerId,
            ErrorResponse,
            FieldError,
            // Customer DTOs
            CreateCustomerRequest,
            CustomerCountResponse,
            // Data-structure DTOs
            HyperLogLogRequest,
            TransactionOp,
            TransactionRequest,
            MessageResponse,
            AddedResponse,
            ExistsResponse,
            CountResponse,
            PublishResponse,
            // Health
            HealthResponse,
            ReadinessResponse,
            ComponentHealth,
        )
    ),
    tags(
        (name = "customers", description = "Cached customer records"),
        (name = "cache", description = "Redis data-structure passthrough"),
        (name = "health", description = "Health check endpoints")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_both_facades() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        assert!(paths.contains_key("/customers"));
        assert!(paths.contains_key("/customers/{id}"));
        assert!(paths.contains_key("/cache/execute-transaction"));
        assert!(paths.contains_key("/health"));
    }
}
