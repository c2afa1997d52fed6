//! Data Transfer Objects (DTOs).

mod cache_dto;
mod customer_dto;

pub use cache_dto::*;
pub use customer_dto::*;
