//! Encoding of cached values.

use cachier_core::{CachierError, CachierResult};
use serde::{de::DeserializeOwned, Serialize};

/// Converts typed values to and from the string form held by the cache.
pub trait Codec: Send + Sync + 'static {
    /// Encodes a value.
    fn encode<T: Serialize>(&self, value: &T) -> CachierResult<String>;

    /// Decodes a value. Failures are `CachierError::Codec`.
    fn decode<T: DeserializeOwned>(&self, raw: &str) -> CachierResult<T>;
}

/// JSON codec.
///
/// Sequences always encode as arrays, so an empty collection is `[]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> CachierResult<String> {
        Ok(serde_json::to_string(value)?)
    }

    fn decode<T: DeserializeOwned>(&self, raw: &str) -> CachierResult<T> {
        serde_json::from_str(raw).map_err(|e| CachierError::Codec(e.to_string()))
    }
}
