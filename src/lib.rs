//! vpnconf fetches a VPN configuration profile over HTTP and drives the
//! connection session built on it.
//!
//! The fetch follows redirects, backs off when throttled, transparently
//! decodes gzip and reports progress through a callback that can stop the
//! transfer at any chunk. A session manager sequences the download, the
//! hand-off to an external connection engine and the connection status, with
//! every background job scoped under a named, cancellable task scope.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use vpnconf::{DownloaderBuilder, Error};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Error> {
//! let downloader = DownloaderBuilder::new().build()?;
//! let outcome = downloader
//!     .fetch(
//!         "https://10.0.0.1/config.ovpn",
//!         Path::new("config.ovpn"),
//!         |progress| {
//!             println!("{}%", progress.percent());
//!             true
//!         },
//!     )
//!     .await?;
//! println!("{} bytes", outcome.bytes());
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`http`] - The HTTP client: redirects, backoff, ranges and gzip
//! - [`download`] - Fetch sources, progress and outcomes
//! - [`downloader`] - The [`Downloader`] streaming a source to a file
//! - [`supervisor`] - Named scopes of cancellable background jobs
//! - [`session`] - The [`SessionManager`] state machine
//! - [`progress`] - An indicatif progress bar observing a session
//! - [`error`] - Centralized error handling with the `Error` enum
//! - [`utils`] - Header parsing helpers

pub mod download;
pub mod downloader;
pub mod error;
pub mod http;
pub mod progress;
pub mod session;
pub mod supervisor;
pub mod utils;

pub use download::{DownloadProgress, FetchOutcome, Source};
pub use downloader::{Downloader, DownloaderBuilder};
pub use error::{Error, ErrorKind, Result};
pub use http::{create_http_client, HttpClient, HttpClientConfig};
pub use progress::{ProgressBarOpts, ProgressObserver};
pub use session::{
    ConnectionEngine, ConnectionStatus, EngineEvent, SessionManager, SessionManagerBuilder,
    SessionObserver, SessionState,
};
pub use supervisor::{PendingJobs, TaskSupervisor};
pub use utils::{get_content_length, parse_content_range_total};
