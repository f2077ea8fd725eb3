// Utility functions
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Converts a Unix timestamp in milliseconds to `DateTime<Utc>`, if it is in range.
pub fn millis_to_datetime(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
}

/// `initial * 2^attempt`, saturating instead of overflowing.
pub fn backoff_delay(initial: Duration, attempt: u32) -> Duration {
    let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
    initial.saturating_mul(factor)
}

/// Parses a `Retry-After` value given in (possibly fractional) seconds.
/// HTTP-date values are not supported and yield `None`.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    let secs: f64 = value.trim().parse().ok()?;
    if !secs.is_finite() || secs < 0.0 {
        return None;
    }
    Duration::try_from_secs_f64(secs).ok()
}
