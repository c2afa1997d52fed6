//! # Cachier Repository
//!
//! The record store side of the cache-aside pair.
//!
//! ```text
//! CacheAside
//!   ↓  Arc<dyn CustomerRepository>  (RecordStore + count)
//! MySqlCustomerRepository
//!   ↓  Arc<dyn DatabasePoolInterface>
//! MySQL
//! ```

pub mod mysql;
pub mod pool;
pub mod traits;

pub use mysql::*;
pub use pool::*;
pub use traits::*;
