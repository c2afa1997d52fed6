//! Caching layer: the key-value cache contract, its backends, and the
//! cache-aside orchestrator built on top of them.

mod cache_aside;
mod cache_interface;
pub mod cache_keys;
mod codec;
mod memory_cache;
mod redis_cache;
mod single_flight;
pub(crate) mod ttl;

pub use cache_aside::*;
pub use cache_interface::*;
pub use codec::*;
pub use memory_cache::*;
pub use redis_cache::*;
pub use single_flight::*;
