//! Customer controller.

use crate::{
    extractors::ValidatedJson,
    responses::{created, found, no_content, ok, ApiResponse, ApiResult, AppError},
    state::AppState,
};
use cachier_core::{CachierError, Customer, CustomerId};
use cachier_service::{CreateCustomerRequest, CustomerCountResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::debug;

/// Creates the customer router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_customers).post(create_customer))
        .route("/count", get(count_customers))
        .route("/:id", get(get_customer).delete(delete_customer))
}

/// List all customers (served from cache when warm).
#[utoipa::path(
    get,
    path = "/customers",
    tag = "customers",
    responses(
        (status = 200, description = "All customers", body = [Customer])
    )
)]
pub async fn list_customers(State(state): State<AppState>) -> ApiResult<Vec<Customer>> {
    debug!("List customers request");

    let customers = state.customer_service.list_customers().await?;
    ok(customers)
}

/// Create a new customer.
#[utoipa::path(
    post,
    path = "/customers",
    tag = "customers",
    request_body = CreateCustomerRequest,
    responses(
        (status = 201, description = "Customer created", body = Customer),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn create_customer(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Customer>>), AppError> {
    debug!("Create customer request: {}", request.customer_name);

    let customer = state.customer_service.create_customer(request).await?;
    Ok(created(customer))
}

/// Get a customer by ID.
#[utoipa::path(
    get,
    path = "/customers/{id}",
    tag = "customers",
    params(("id" = i64, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Customer found", body = Customer),
        (status = 404, description = "Customer not found")
    )
)]
pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Customer> {
    debug!("Get customer request: {}", id);

    let customer_id = parse_customer_id(&id)?;
    let customer = state.customer_service.get_customer(customer_id).await?;
    ok(found(customer, "Customer", customer_id)?)
}

/// Delete a customer.
#[utoipa::path(
    delete,
    path = "/customers/{id}",
    tag = "customers",
    params(("id" = i64, Path, description = "Customer ID")),
    responses(
        (status = 204, description = "Customer deleted"),
        (status = 404, description = "Customer not found")
    )
)]
pub async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    debug!("Delete customer request: {}", id);

    let customer_id = parse_customer_id(&id)?;
    if state.customer_service.delete_customer(customer_id).await? {
        Ok(no_content())
    } else {
        Err(AppError(CachierError::not_found("Customer", customer_id)))
    }
}

/// Count stored customers.
#[utoipa::path(
    get,
    path = "/customers/count",
    tag = "customers",
    responses(
        (status = 200, description = "Customer count", body = CustomerCountResponse)
    )
)]
pub async fn count_customers(State(state): State<AppState>) -> ApiResult<CustomerCountResponse> {
    let count = state.customer_service.count_customers().await?;
    ok(CustomerCountResponse { count })
}

/// Helper to parse customer ID from path parameter.
fn parse_customer_id(id: &str) -> Result<CustomerId, AppError> {
    CustomerId::parse(id)
        .map_err(|_| AppError(CachierError::Validation(format!("Invalid customer ID: {id}"))))
}
