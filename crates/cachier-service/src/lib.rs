//! # Cachier Service
//!
//! Service layer for Cachier: the cache-aside orchestrator, the key-value
//! cache backends it runs on, the customer service built from them, and the
//! Redis data-structure passthrough.

pub mod cache;
pub mod customer_service;
pub mod data_structure_service;
pub mod dto;
pub mod r#impl;

pub use cache::*;
pub use customer_service::*;
pub use data_structure_service::*;
pub use dto::*;
pub use r#impl::*;
