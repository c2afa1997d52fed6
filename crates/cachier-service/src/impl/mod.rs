//! Service implementations.
//!
//! Trait definitions live in the parent module (e.g. `customer_service.rs`).

pub mod customer_service_impl;
pub mod redis_data_structure_service;

pub use customer_service_impl::{CustomerServiceImpl, CustomerServiceParameters};
pub use redis_data_structure_service::{
    Listeners, RedisDataStructureService, RedisDataStructureServiceParameters,
};
