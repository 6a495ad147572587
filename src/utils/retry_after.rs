//! `Retry-After` handling for throttled (429) responses.

use reqwest::header::{HeaderMap, RETRY_AFTER};
use std::time::Duration;

/// Delay applied when the server gives no usable `Retry-After` value.
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(1);

/// Read the backoff delay requested by a throttled response.
///
/// Only the delay-seconds form is understood. A missing header, a zero value
/// or anything that is not an integer (an HTTP date, for instance) falls back
/// to [`DEFAULT_RETRY_AFTER`].
///
/// ```rust
/// use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER};
/// use std::time::Duration;
/// use vpnconf::utils::parse_retry_after;
///
/// let mut headers = HeaderMap::new();
/// headers.insert(RETRY_AFTER, HeaderValue::from_static("3"));
/// assert_eq!(parse_retry_after(&headers), Duration::from_secs(3));
/// ```
pub fn parse_retry_after(headers: &HeaderMap) -> Duration {
    headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_RETRY_AFTER)
}
