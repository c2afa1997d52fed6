//! Validated JSON extractor.
//!
//! `ValidatedJson<T>` deserializes the body and runs `validator` rules on it.
//! Malformed JSON is a 400; rule violations are a 422 carrying one
//! [`FieldError`] per failed rule, nested fields flattened to dotted paths.

use crate::responses::ApiResponse;
use cachier_core::{field_errors, ErrorResponse, FieldError};
use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

/// JSON extractor that validates the deserialized value.
///
/// ```ignore
/// async fn create_customer(ValidatedJson(request): ValidatedJson<CreateCustomerRequest>) {
///     // request.customer_name is 3-250 characters here
/// }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T> std::ops::Deref for ValidatedJson<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Rejection type for validated JSON extraction.
#[derive(Debug)]
pub enum ValidatedJsonRejection {
    /// The body is not JSON of the expected shape.
    JsonError(JsonRejection),
    /// The body parsed but broke validation rules.
    ValidationError(ValidationErrors),
}

impl IntoResponse for ValidatedJsonRejection {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            Self::JsonError(rejection) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    code: "INVALID_JSON".to_string(),
                    message: format!("Invalid JSON: {rejection}"),
                    details: None,
                },
            ),
            Self::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorResponse {
                    code: "VALIDATION_ERROR".to_string(),
                    message: "Request validation failed".to_string(),
                    details: Some(flatten(&errors)),
                },
            ),
        };
        (status, Json(ApiResponse::<()>::error(error))).into_response()
    }
}

/// Collects field errors, descending into nested structs and lists.
fn flatten(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut flat = field_errors(errors);

    for (field, kind) in &errors.0 {
        match kind {
            ValidationErrorsKind::Struct(nested) => {
                flat.extend(flatten(nested).into_iter().map(|e| FieldError {
                    field: format!("{field}.{}", e.field),
                    ..e
                }));
            }
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    flat.extend(flatten(nested).into_iter().map(|e| FieldError {
                        field: format!("{field}[{index}].{}", e.field),
                        ..e
                    }));
                }
            }
            ValidationErrorsKind::Field(_) => {}
        }
    }

    flat
}

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidatedJsonRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ValidatedJsonRejection::JsonError)?;

        value
            .validate()
            .map_err(ValidatedJsonRejection::ValidationError)?;

        Ok(Self(value))
    }
}
