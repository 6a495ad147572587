//! Download module containing the types a fetch works with.
//!
//! - [`source`] - [`Source`], a remote URL or a local path
//! - [`progress`] - [`DownloadProgress`] and [`FetchOutcome`]
//!
//! # Example
//!
//! ```rust
//! use vpnconf::download::{DownloadProgress, FetchOutcome};
//!
//! let mut progress = DownloadProgress::new(1024);
//! progress.advance(512);
//! println!("{}% done", progress.percent());
//!
//! let outcome = FetchOutcome::Cancelled { bytes: progress.transferred() };
//! assert!(!outcome.is_completed());
//! ```

pub mod progress;
pub mod source;

pub use progress::{DownloadProgress, FetchOutcome};
pub use source::Source;
