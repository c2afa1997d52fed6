//! Application state for Axum handlers.

use crate::responses::AppError;
use cachier_core::{CachierError, HealthCheck};
use cachier_service::{CustomerService, DataStructureService};
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub customer_service: Arc<dyn CustomerService>,
    /// Absent when Redis is disabled.
    pub data_structures: Option<Arc<dyn DataStructureService>>,
    /// Dependencies probed by `/ready`.
    pub health_checks: Vec<Arc<dyn HealthCheck>>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(customer_service: Arc<dyn CustomerService>) -> Self {
        Self {
            customer_service,
            data_structures: None,
            health_checks: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_data_structures(mut self, service: Arc<dyn DataStructureService>) -> Self {
        self.data_structures = Some(service);
        self
    }

    #[must_use]
    pub fn with_health_check(mut self, check: Arc<dyn HealthCheck>) -> Self {
        self.health_checks.push(check);
        self
    }

    /// Returns the data-structure service, or 503 when Redis is disabled.
    pub fn data_structures(&self) -> Result<&Arc<dyn DataStructureService>, AppError> {
        self.data_structures.as_ref().ok_or_else(|| {
            AppError(CachierError::Unavailable(
                "Redis data structures are disabled".to_string(),
            ))
        })
    }
}
