//! Validation utilities.

use crate::{CachierError, FieldError};
use validator::{Validate, ValidationErrors};

/// Extension trait for validation.
pub trait ValidateExt: Validate {
    /// Validates the struct and returns a `CachierError` on failure.
    fn validate_request(&self) -> Result<(), CachierError> {
        self.validate().map_err(validation_errors_to_cachier_error)
    }
}

impl<T: Validate> ValidateExt for T {}

/// Flattens `validator::ValidationErrors` into field errors.
#[must_use]
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| FieldError {
                field: (*field).to_string(),
                message: error
                    .message
                    .as_ref()
                    .map_or_else(|| error.code.to_string(), |m| m.to_string()),
                code: error.code.to_string(),
            })
        })
        .collect()
}

/// Converts `validator::ValidationErrors` to `CachierError`.
#[must_use]
pub fn validation_errors_to_cachier_error(errors: ValidationErrors) -> CachierError {
    let message = field_errors(&errors)
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ");

    CachierError::Validation(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Debug, Validate)]
    struct Named {
        #[validate(length(min = 3, max = 250, message = "Name must be 3-250 characters"))]
        name: String,
    }

    #[test]
    fn test_valid_struct_passes() {
        let named = Named { name: "Acme".to_string() };
        assert!(named.validate_request().is_ok());
    }

    #[test]
    fn test_invalid_struct_maps_to_validation_error() {
        let named = Named { name: "ab".to_string() };
        let err = named.validate_request().unwrap_err();
        match err {
            CachierError::Validation(message) => {
                assert!(message.contains("name"));
                assert!(message.contains("3-250"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_field_errors_carry_code() {
        let named = Named { name: "x".repeat(251) };
        let errors = named.validate().unwrap_err();
        let fields = field_errors(&errors);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].field, "name");
        assert_eq!(fields[0].code, "length");
    }
}
