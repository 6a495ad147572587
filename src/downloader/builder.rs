//! Builder pattern implementation for creating Downloader instances.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use vpnconf::downloader::DownloaderBuilder;
//!
//! # fn example() -> vpnconf::Result<()> {
//! let downloader = DownloaderBuilder::new()
//!     .connect_timeout(Duration::from_secs(10))
//!     .max_redirects(3)
//!     .build()?;
//! # Ok(())
//! # }
//! ```

use super::{config::DownloaderConfig, downloader::Downloader};
use crate::error::Result;
use crate::http::create_http_client;

use reqwest::header::{HeaderMap, HeaderValue, IntoHeaderName};
use reqwest::Proxy;
use std::time::Duration;

/// A builder used to create a [`Downloader`].
///
/// ```rust
/// use vpnconf::downloader::DownloaderBuilder;
///
/// let d = DownloaderBuilder::new().buffer_size(16 * 1024).build().unwrap();
/// assert_eq!(d.buffer_size(), 16 * 1024);
/// ```
#[derive(Debug, Default)]
pub struct DownloaderBuilder {
    config: DownloaderConfig,
}

impl DownloaderBuilder {
    /// Creates a builder with the default options.
    pub fn new() -> Self {
        DownloaderBuilder::default()
    }

    /// Set the connect timeout of every request.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.http.connect_timeout = timeout;
        self
    }

    /// Set the read timeout of every request.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.config.http.read_timeout = timeout;
        self
    }

    /// Set the number of redirects and rate-limit retries allowed per fetch.
    pub fn max_redirects(mut self, max_redirects: u32) -> Self {
        self.config.http.max_redirects = max_redirects;
        self
    }

    /// Set the user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.http.user_agent = user_agent.into();
        self
    }

    /// Route requests through a proxy.
    pub fn proxy(mut self, proxy: Proxy) -> Self {
        self.config.http.proxy = Some(proxy);
        self
    }

    /// Set the size of the read buffer. Zero is bumped to one byte.
    pub fn buffer_size(mut self, buffer_size: usize) -> Self {
        self.config.buffer_size = buffer_size.max(1);
        self
    }

    /// Helper method to get or create a new HeaderMap.
    fn new_header(&self) -> HeaderMap {
        match self.config.http.headers {
            Some(ref h) => h.to_owned(),
            _ => HeaderMap::new(),
        }
    }

    /// Add the http headers.
    ///
    /// You can call `.headers()` multiple times and all `HeaderMap` will be
    /// merged into a single one.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        let mut new = self.new_header();
        new.extend(headers);

        self.config.http.headers = Some(new);
        self
    }

    /// Add the http header
    ///
    /// ```
    /// use reqwest::header::{self, HeaderValue};
    /// use vpnconf::downloader::DownloaderBuilder;
    ///
    /// let auth = HeaderValue::from_str("Basic aGk6MTIzNDU2Cg==").expect("Invalid auth");
    ///
    /// let downloader = DownloaderBuilder::new()
    ///     .header(header::AUTHORIZATION, auth)
    ///     .build()
    ///     .unwrap();
    /// ```
    pub fn header<K: IntoHeaderName>(mut self, name: K, value: HeaderValue) -> Self {
        let mut new = self.new_header();

        new.insert(name, value);

        self.config.http.headers = Some(new);
        self
    }

    /// Create the [`Downloader`] with the specified options.
    pub fn build(self) -> Result<Downloader> {
        let client = create_http_client(&self.config.http)?;
        Ok(Downloader::new(self.config, client))
    }
}
