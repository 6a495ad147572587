//! Content length extraction utilities.
//!
//! This module resolves the total size of a resource from response headers,
//! supporting both Content-Range and Content-Length headers.

use reqwest::header::{HeaderMap, ACCEPT_RANGES, CONTENT_LENGTH, CONTENT_RANGE};

/// Resolve the total size of a resource from its response headers.
///
/// The total carried by a `Content-Range` header (`bytes 0-999/5000`) wins.
/// When it is missing or its total is not a number, the `Content-Length`
/// header is used instead.
///
/// # Returns
///
/// The size as an u64, or 0 if neither header holds a valid value
///
/// # Example
///
/// ```rust
/// use reqwest::header::{HeaderMap, HeaderValue, CONTENT_RANGE};
/// use vpnconf::utils::get_content_length;
///
/// let mut headers = HeaderMap::new();
/// headers.insert(CONTENT_RANGE, HeaderValue::from_static("bytes 0-999/5000"));
/// assert_eq!(get_content_length(&headers), 5000);
/// ```
pub fn get_content_length(headers: &HeaderMap) -> u64 {
    headers
        .get(CONTENT_RANGE)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_content_range_total)
        .or_else(|| {
            headers
                .get(CONTENT_LENGTH)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse::<u64>().ok())
        })
        .unwrap_or(0)
}

/// Parse Content-Range header to extract total size.
///
/// Content-Range header format: "bytes start-end/total"
///
/// # Example
///
/// ```rust
/// use vpnconf::utils::parse_content_range_total;
///
/// let total = parse_content_range_total("bytes 0-1023/2048");
/// assert_eq!(total, Some(2048));
/// ```
pub fn parse_content_range_total(content_range: &str) -> Option<u64> {
    let (_, total) = content_range.rsplit_once('/')?;
    total.trim().parse::<u64>().ok()
}

/// Whether the server allows resuming with range requests.
///
/// Only an explicit `Accept-Ranges: none` disables resuming; a missing header
/// leaves the question open and counts as accepted.
pub fn accepts_ranges(headers: &HeaderMap) -> bool {
    match headers.get(ACCEPT_RANGES).and_then(|v| v.to_str().ok()) {
        Some(value) => !value.trim().eq_ignore_ascii_case("none"),
        None => true,
    }
}
