//! Downloader module containing core downloader functionality, builder pattern, and configuration.
//!
//! - `downloader` - Core Downloader struct with the chunked fetch loop
//! - `builder` - DownloaderBuilder for flexible configuration using the builder pattern
//! - `config` - Configuration structures and defaults
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use vpnconf::downloader::DownloaderBuilder;
//!
//! # async fn example() -> vpnconf::Result<()> {
//! let downloader = DownloaderBuilder::new().build()?;
//! let outcome = downloader
//!     .fetch("https://example.com/config.ovpn", Path::new("config.ovpn"), |_| true)
//!     .await?;
//! println!("{} bytes", outcome.bytes());
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod config;
#[allow(clippy::module_inception)]
pub mod downloader;

pub use builder::DownloaderBuilder;
pub use config::{DownloaderConfig, DEFAULT_BUFFER_SIZE};
pub use downloader::Downloader;
