//! # Cachier REST
//!
//! REST API layer using Axum for Cachier.
//! Provides HTTP endpoints for customers, the Redis data-structure
//! passthrough, and health checks.

pub mod controllers;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod responses;
pub mod router;
pub mod state;

pub use router::*;
pub use state::*;
