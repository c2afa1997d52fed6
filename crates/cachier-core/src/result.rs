//! Result type aliases for Cachier.

use crate::CachierError;

/// A specialized `Result` type for Cachier operations.
pub type CachierResult<T> = Result<T, CachierError>;

