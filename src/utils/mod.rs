//! Shared utility functions.
//!
//! Header parsing helpers used by the fetch client:
//!
//! - [`content_length`] - total size resolution and `Accept-Ranges` handling
//! - [`retry_after`] - backoff delay of throttled responses
//!
//! # Example
//!
//! ```rust
//! use vpnconf::utils::parse_content_range_total;
//!
//! let header_value = "bytes 0-1023/2048";
//! if let Some(total_size) = parse_content_range_total(header_value) {
//!     println!("Total file size: {} bytes", total_size);
//! }
//! ```

pub mod content_length;
pub mod retry_after;

pub use content_length::{accepts_ranges, get_content_length, parse_content_range_total};
pub use retry_after::{parse_retry_after, DEFAULT_RETRY_AFTER};
