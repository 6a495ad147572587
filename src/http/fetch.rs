//! Single-resource fetch client.
//!
//! [`HttpClient`] opens one resource at a time. `connect` follows
//! `301`/`302`/`303` redirects and waits out `429` responses, both counted
//! against the same cap. Once connected, `read` pulls the (optionally gzip
//! encoded) body into caller-provided buffers.
//!
//! # Example
//!
//! ```rust,no_run
//! use vpnconf::http::{create_http_client, HttpClient, HttpClientConfig};
//!
//! # async fn example() -> vpnconf::Result<()> {
//! let client = create_http_client(&HttpClientConfig::default())?;
//! let mut http = HttpClient::new(client, "https://example.com/config.ovpn");
//!
//! http.connect(0).await?;
//! let mut buffer = vec![0u8; 65535];
//! while http.read(&mut buffer).await? > 0 {}
//! http.close();
//! # Ok(())
//! # }
//! ```

use crate::error::{Error, Result};
use crate::utils::{accepts_ranges, get_content_length, parse_retry_after};

use bytes::Bytes;
use flate2::write::GzDecoder;
use reqwest::{
    header::{HeaderMap, ACCEPT, ACCEPT_ENCODING, CONTENT_ENCODING, LOCATION, RANGE},
    Response, StatusCode, Url,
};
use reqwest_middleware::ClientWithMiddleware;
use std::borrow::Cow;
use std::fmt;
use std::io::Write;
use tracing::{debug, warn};

/// Fix up and parse a user supplied URL.
///
/// A scheme separator mangled into `:/` (as happens when URLs travel through
/// path-like settings) is repaired before parsing. Only HTTP(S) is accepted.
///
/// ```rust
/// use vpnconf::http::normalize_url;
///
/// let url = normalize_url("https:/example.com/config.ovpn").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/config.ovpn");
/// ```
pub fn normalize_url(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    let fixed = if raw.contains("://") {
        Cow::Borrowed(raw)
    } else {
        Cow::Owned(raw.replacen(":/", "://", 1))
    };

    let url = Url::parse(&fixed)
        .map_err(|e| Error::MalformedUrl(format!("\"{}\" cannot be parsed: {}", raw, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(Error::MalformedUrl(format!(
            "\"{}\" uses the unsupported scheme \"{}\"",
            raw, scheme
        ))),
    }
}

/// Per-connection state, created by `connect` and dropped by `close`.
#[derive(Debug)]
pub struct FetchState {
    /// URL of the final response.
    url: Url,
    /// Status of the final response.
    status: StatusCode,
    /// Total length resolved from the response headers.
    content_length: u64,
    /// Body is gzip encoded.
    gzip: bool,
    /// Redirects and backoffs performed before the final response.
    redirects: u32,
    /// Server did not answer `Accept-Ranges: none`.
    accepts_ranges: bool,
    /// Body source; `None` once the end of the stream was reached.
    response: Option<Response>,
    decoder: Option<GzDecoder<Vec<u8>>>,
    /// Decoded bytes not handed out yet.
    pending: Bytes,
    /// Failure hit while topping up a partially filled buffer.
    deferred: Option<Error>,
}

impl FetchState {
    fn new(url: Url, response: Response, redirects: u32) -> Self {
        let headers = response.headers();
        let gzip = is_gzip(headers);
        let content_length = get_content_length(headers);
        let accepts_ranges = accepts_ranges(headers);

        Self {
            url,
            status: response.status(),
            content_length,
            gzip,
            redirects,
            accepts_ranges,
            decoder: gzip.then(|| GzDecoder::new(Vec::new())),
            response: Some(response),
            pending: Bytes::new(),
            deferred: None,
        }
    }

    async fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        if let Some(err) = self.deferred.take() {
            return Err(err);
        }

        let mut filled = self.read_once(buf).await?;

        // Avoid handing tiny reads to the caller while more data is coming.
        while filled > 0 && filled < buf.len() / 2 {
            match self.read_once(&mut buf[filled..]).await {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) => {
                    warn!("Read failed after {} buffered bytes: {}", filled, e);
                    self.deferred = Some(e);
                    break;
                }
            }
        }

        Ok(filled)
    }

    async fn read_once(&mut self, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        loop {
            if !self.pending.is_empty() {
                let n = buf.len().min(self.pending.len());
                buf[..n].copy_from_slice(&self.pending.split_to(n));
                return Ok(n);
            }

            let Some(response) = self.response.as_mut() else {
                return Ok(0);
            };

            match response.chunk().await? {
                Some(chunk) => self.pending = self.decode(chunk)?,
                None => {
                    self.response = None;
                    self.pending = self.finish_decoder()?;
                }
            }
        }
    }

    fn decode(&mut self, chunk: Bytes) -> Result<Bytes> {
        match self.decoder.as_mut() {
            Some(decoder) => {
                decoder.write_all(&chunk)?;
                Ok(Bytes::from(std::mem::take(decoder.get_mut())))
            }
            None => Ok(chunk),
        }
    }

    fn finish_decoder(&mut self) -> Result<Bytes> {
        match self.decoder.take() {
            Some(mut decoder) => {
                decoder.try_finish()?;
                Ok(Bytes::from(std::mem::take(decoder.get_mut())))
            }
            None => Ok(Bytes::new()),
        }
    }
}

/// Resumable fetch client for a single resource.
pub struct HttpClient {
    client: ClientWithMiddleware,
    url: String,
    max_redirects: u32,
    state: Option<FetchState>,
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("url", &self.url)
            .field("max_redirects", &self.max_redirects)
            .field("state", &self.state)
            .finish()
    }
}

impl HttpClient {
    /// Creates a client for `url`. Nothing is sent until [`HttpClient::connect`].
    pub fn new(client: ClientWithMiddleware, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            max_redirects: 5,
            state: None,
        }
    }

    /// Set the number of redirects and rate-limit retries allowed.
    pub fn max_redirects(mut self, max_redirects: u32) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    /// Connect to the resource, optionally resuming at `resume_offset`.
    ///
    /// Returns the resolved total size, or `None` when the server announced
    /// `Accept-Ranges: none` and the size can't be used to resume.
    pub async fn connect(&mut self, resume_offset: u64) -> Result<Option<u64>> {
        self.close();

        let mut url = normalize_url(&self.url)?;
        let mut redirects = 0u32;

        let response = loop {
            let mut req = self
                .client
                .get(url.clone())
                .header(ACCEPT, "*/*")
                .header(ACCEPT_ENCODING, "gzip");
            if resume_offset > 0 {
                req = req.header(RANGE, format!("bytes={}-", resume_offset));
            }

            let response = req.send().await?;
            let status = response.status();

            match status {
                StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND | StatusCode::SEE_OTHER => {
                    redirects += 1;
                    let next = redirect_target(&url, &response)?;
                    debug!("{} redirected to {} ({})", url, next, status);
                    url = next;
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    redirects += 1;
                    if redirects <= self.max_redirects {
                        let delay = parse_retry_after(response.headers());
                        drop(response);
                        debug!("{} is rate limited, retrying in {:?}", url, delay);
                        tokio::time::sleep(delay).await;
                    }
                }
                _ => break response,
            }

            if redirects > self.max_redirects {
                warn!("Giving up on {} after {} redirects", url, redirects);
                return Err(Error::TooManyRedirects {
                    url: url.to_string(),
                });
            }
        };

        let status = response.status();
        if status != StatusCode::OK && status != StatusCode::PARTIAL_CONTENT {
            return Err(Error::Http {
                url: url.to_string(),
                status,
            });
        }

        let state = FetchState::new(url, response, redirects);
        debug!(
            "Connected to {} ({}, {} bytes, gzip: {})",
            state.url, state.status, state.content_length, state.gzip
        );

        let size = state.accepts_ranges.then_some(state.content_length);
        self.state = Some(state);
        Ok(size)
    }

    /// Total length of the resource, preferring the `Content-Range` total
    /// over `Content-Length`. Returns 0 when unknown or not connected.
    pub fn size(&self) -> u64 {
        self.state.as_ref().map_or(0, |s| s.content_length)
    }

    /// Read decoded body bytes into `buf`.
    ///
    /// Returns 0 at the end of the stream.
    pub async fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let state = self.state.as_mut().ok_or(Error::NotConnected)?;
        state.read(buf).await
    }

    /// Release the response and its connection. Safe to call repeatedly.
    pub fn close(&mut self) {
        if let Some(state) = self.state.take() {
            debug!("Closing connection to {}", state.url);
        }
    }

    /// Whether `connect` succeeded and `close` has not been called since.
    pub fn is_connected(&self) -> bool {
        self.state.is_some()
    }

    /// The current URL: the final one after redirects once connected.
    pub fn url(&self) -> &str {
        self.state
            .as_ref()
            .map_or(self.url.as_str(), |s| s.url.as_str())
    }

    /// Status of the final response.
    pub fn status(&self) -> Option<StatusCode> {
        self.state.as_ref().map(|s| s.status)
    }

    /// Whether the body is gzip encoded.
    pub fn is_gzip(&self) -> bool {
        self.state.as_ref().is_some_and(|s| s.gzip)
    }

    /// Redirects and backoffs performed by the last `connect`.
    pub fn redirects(&self) -> u32 {
        self.state.as_ref().map_or(0, |s| s.redirects)
    }
}

fn redirect_target(current: &Url, response: &Response) -> Result<Url> {
    let location = response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| Error::Http {
            url: current.to_string(),
            status: response.status(),
        })?;

    current
        .join(location)
        .map_err(|e| Error::MalformedUrl(format!("redirect to \"{}\": {}", location, e)))
}

fn is_gzip(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_ENCODING)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("gzip"))
}
