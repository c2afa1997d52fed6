//! Query and body shapes for the data-structure endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// A single key.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct KeyQuery {
    pub key: String,
}

/// A key and a member value.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct KeyValueQuery {
    pub key: String,
    pub value: String,
}

/// String write with an optional absolute expiration (RFC 3339).
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct SetStringQuery {
    pub key: String,
    pub value: String,
    pub expiration_time: Option<DateTime<Utc>>,
}

/// A hash key and field.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct HashFieldQuery {
    pub key: String,
    pub field: String,
}

/// A hash field write.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct SetHashFieldQuery {
    pub key: String,
    pub field: String,
    pub value: String,
}

/// Index range over a list or sorted set; negative indexes count from the end.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct RangeQuery {
    pub key: String,
    #[serde(default)]
    pub start: i64,
    #[serde(default = "default_stop")]
    pub stop: i64,
}

const fn default_stop() -> i64 {
    -1
}

/// Sorted set member with its score.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct ScoredValueQuery {
    pub key: String,
    pub value: String,
    pub score: f64,
}

/// A pub/sub channel.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct ChannelQuery {
    pub channel: String,
}

/// A message for a channel.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct PublishQuery {
    pub channel: String,
    pub message: String,
}

/// Values added to a HyperLogLog.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct HyperLogLogRequest {
    #[validate(length(min = 1, max = 512, message = "Key must be 1-512 characters"))]
    pub key: String,
    #[validate(length(min = 1, message = "At least one value is required"))]
    pub values: Vec<String>,
}

/// One command inside a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TransactionOp {
    /// Set a string value.
    Set { key: String, value: String },
    /// Delete a key.
    Delete { key: String },
}

/// Commands executed atomically, in order.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct TransactionRequest {
    #[validate(length(min = 1, message = "A transaction needs at least one operation"))]
    pub ops: Vec<TransactionOp>,
}

/// Human-readable outcome of a write.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Whether an add created a new member or field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct AddedResponse {
    pub added: bool,
}

/// Whether a key exists.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct ExistsResponse {
    pub exists: bool,
}

/// Result of a count-style operation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct CountResponse {
    pub count: u64,
}

/// Result of a publish.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct PublishResponse {
    /// Subscribers that received the message.
    pub receivers: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_ops_are_tagged() {
        let request: TransactionRequest = serde_json::from_str(
            r#"{"ops":[{"op":"set","key":"a","value":"1"},{"op":"delete","key":"a"}]}"#,
        )
        .unwrap();
        assert_eq!(
            request.ops,
            vec![
                TransactionOp::Set {
                    key: "a".to_string(),
                    value: "1".to_string()
                },
                TransactionOp::Delete {
                    key: "a".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_empty_transaction_is_invalid() {
        let request = TransactionRequest { ops: Vec::new() };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_range_defaults_to_whole_sequence() {
        let range: RangeQuery = serde_json::from_str(r#"{"key":"queue"}"#).unwrap();
        assert_eq!((range.start, range.stop), (0, -1));
    }
}
