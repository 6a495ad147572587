//! HTTP module containing the fetch client.
//!
//! - [`client`] - reqwest client creation and middleware configuration
//! - [`fetch`] - [`HttpClient`], the redirect/backoff aware single-resource client
//!
//! # Example
//!
//! ```rust,no_run
//! use vpnconf::http::{create_http_client, HttpClient, HttpClientConfig};
//!
//! # async fn example() -> vpnconf::Result<()> {
//! let client = create_http_client(&HttpClientConfig::default())?;
//! let mut http = HttpClient::new(client, "https://example.com/config.ovpn");
//! let size = http.connect(0).await?;
//! println!("Resumable size: {:?}", size);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod fetch;

pub use client::{create_http_client, HttpClientConfig, DEFAULT_USER_AGENT};
pub use fetch::{normalize_url, FetchState, HttpClient};
