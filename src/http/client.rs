//! HTTP client setup and middleware configuration.
//!
//! Builds the reqwest client shared by every fetch. Redirects are disabled at
//! the reqwest level because [`HttpClient`](super::HttpClient) follows them
//! itself, counting them together with rate-limit backoffs.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use vpnconf::http::{create_http_client, HttpClientConfig};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HttpClientConfig {
//!     connect_timeout: Duration::from_secs(10),
//!     ..HttpClientConfig::default()
//! };
//! let client = create_http_client(&config)?;
//! # Ok(())
//! # }
//! ```

use reqwest::{header::HeaderMap, redirect::Policy, Proxy};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;
use std::time::Duration;

/// User agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!("vpnconf/", env!("CARGO_PKG_VERSION"));

/// Configuration for HTTP client setup.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Timeout for establishing a connection.
    pub connect_timeout: Duration,
    /// Timeout for each read on the response body.
    pub read_timeout: Duration,
    /// Redirects and rate-limit retries allowed per connection attempt.
    pub max_redirects: u32,
    /// User agent.
    pub user_agent: String,
    /// Optional proxy configuration.
    pub proxy: Option<Proxy>,
    /// Default headers to include with all requests.
    pub headers: Option<HeaderMap>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            read_timeout: Duration::from_secs(15),
            max_redirects: 5,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            proxy: None,
            headers: None,
        }
    }
}

/// Creates an HTTP client with middleware configuration.
///
/// This function sets up a reqwest client with:
/// - Tracing middleware for request/response logging
/// - Connect and read timeouts
/// - Redirect following disabled
/// - Optional proxy support
/// - Optional default headers
pub fn create_http_client(
    config: &HttpClientConfig,
) -> Result<ClientWithMiddleware, reqwest::Error> {
    let mut inner_client_builder = reqwest::Client::builder()
        .redirect(Policy::none())
        .connect_timeout(config.connect_timeout)
        .read_timeout(config.read_timeout)
        .user_agent(config.user_agent.as_str());

    if let Some(proxy) = config.proxy.clone() {
        inner_client_builder = inner_client_builder.proxy(proxy);
    }

    if let Some(headers) = config.headers.clone() {
        inner_client_builder = inner_client_builder.default_headers(headers);
    }

    let inner_client = inner_client_builder.build()?;

    let client = ClientBuilder::new(inner_client)
        // Trace HTTP requests. See the tracing crate to make use of these traces.
        .with(TracingMiddleware::default())
        .build();

    Ok(client)
}
