//! Timestamp utilities

use chrono::{DateTime, Utc};

/// Wire format for update timestamps (second resolution, UTC)
pub const FEED_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Format a timestamp for an update payload
pub fn feed_timestamp(at: DateTime<Utc>) -> String {
    at.format(FEED_TIMESTAMP_FORMAT).to_string()
}

/// Seconds elapsed between `since` and `now`, clamped at zero
pub fn age_secs(since: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    (now - since).num_seconds().max(0) as u64
}
