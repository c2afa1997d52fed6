//! REST API controllers.

pub mod cache_controller;
pub mod customer_controller;
pub mod health_controller;

pub use health_controller::*;
