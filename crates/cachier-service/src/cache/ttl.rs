//! Conversion of absolute expirations into Redis millisecond TTLs.

use chrono::{DateTime, Utc};

/// Milliseconds until `expires_at`, or `None` when it is not in the future.
#[must_use]
pub fn remaining_millis(now: DateTime<Utc>, expires_at: DateTime<Utc>) -> Option<u64> {
    u64::try_from((expires_at - now).num_milliseconds())
        .ok()
        .filter(|ms| *ms > 0)
}
