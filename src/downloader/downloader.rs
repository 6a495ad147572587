//! Core downloader implementation with fetch logic.
//!
//! The [`Downloader`] streams one resource to a destination file, reporting
//! progress after every chunk. The progress callback doubles as the
//! cancellation channel: returning `false` stops the transfer at the next
//! chunk boundary.
//!
//! The destination is deleted before writing and no atomic rename happens
//! afterwards, so a cancelled or failed fetch leaves a partial file behind.
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
//!     .fetch(
//!         "https://example.com/config.ovpn",
//!         Path::new("config.ovpn"),
//!         |progress| {
//!             println!("{}%", progress.percent());
//!             true
//!         },
//!     )
//!     .await?;
//! assert!(outcome.is_completed());
//! # Ok(())
//! # }
//! ```

use super::config::DownloaderConfig;
use crate::download::{DownloadProgress, FetchOutcome, Source};
use crate::error::Result;
use crate::http::HttpClient;

use reqwest::Url;
use reqwest_middleware::ClientWithMiddleware;
use std::fmt;
use std::io::ErrorKind;
use std::path::Path;
use tokio::{fs, fs::File, io::AsyncWriteExt};
use tracing::{debug, warn};

/// Represents the download controller.
///
/// A downloader can be created via its builder:
///
/// ```rust
/// use vpnconf::downloader::DownloaderBuilder;
///
/// let d = DownloaderBuilder::new().build().unwrap();
/// ```
#[derive(Clone)]
pub struct Downloader {
    config: DownloaderConfig,
    client: ClientWithMiddleware,
}

impl fmt::Debug for Downloader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Downloader")
            .field("config", &self.config)
            .finish()
    }
}

impl Downloader {
    /// Creates a new Downloader with the given configuration.
    pub(crate) fn new(config: DownloaderConfig, client: ClientWithMiddleware) -> Self {
        Self { config, client }
    }

    /// Gets the read buffer size.
    pub fn buffer_size(&self) -> usize {
        self.config.buffer_size
    }

    /// Gets the downloader configuration.
    pub fn config(&self) -> &DownloaderConfig {
        &self.config
    }

    /// Creates an [`HttpClient`] for `url` sharing this downloader's settings.
    pub fn http_client(&self, url: &str) -> HttpClient {
        HttpClient::new(self.client.clone(), url).max_redirects(self.config.http.max_redirects)
    }

    /// Fetches `source` into `destination`.
    ///
    /// `source` is either an HTTP(S) URL or a local path; a local file is
    /// copied byte for byte without reporting progress. Any file already at
    /// `destination` is deleted first.
    ///
    /// `on_progress` runs after every chunk written. Returning `false` stops
    /// the transfer and yields [`FetchOutcome::Cancelled`], which is not an
    /// error.
    pub async fn fetch<F>(
        &self,
        source: &str,
        destination: &Path,
        mut on_progress: F,
    ) -> Result<FetchOutcome>
    where
        F: FnMut(&DownloadProgress) -> bool,
    {
        let source = Source::parse(source)?;

        if let Source::Local(path) = &source {
            if path == destination {
                let bytes = fs::metadata(path).await?.len();
                return Ok(FetchOutcome::Completed { bytes });
            }
        }

        debug!("Removing previous copy at {:?}", destination);
        match fs::remove_file(destination).await {
            Ok(()) => (),
            Err(e) if e.kind() == ErrorKind::NotFound => (),
            Err(e) => return Err(e.into()),
        }

        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            debug!("Creating destination directory {:?}", parent);
            fs::create_dir_all(parent).await?;
        }

        match source {
            Source::Local(path) => {
                debug!("Copying {:?} to {:?}", path, destination);
                let bytes = fs::copy(&path, destination).await?;
                Ok(FetchOutcome::Completed { bytes })
            }
            Source::Remote(url) => self.fetch_remote(&url, destination, &mut on_progress).await,
        }
    }

    async fn fetch_remote<F>(
        &self,
        url: &Url,
        destination: &Path,
        on_progress: &mut F,
    ) -> Result<FetchOutcome>
    where
        F: FnMut(&DownloadProgress) -> bool,
    {
        let mut http = self.http_client(url.as_str());
        let result = self.stream_to_file(&mut http, destination, on_progress).await;
        http.close();
        result
    }

    async fn stream_to_file<F>(
        &self,
        http: &mut HttpClient,
        destination: &Path,
        on_progress: &mut F,
    ) -> Result<FetchOutcome>
    where
        F: FnMut(&DownloadProgress) -> bool,
    {
        http.connect(0).await?;
        let mut progress = DownloadProgress::new(http.size());

        debug!("Creating destination file {:?}", destination);
        let mut file = File::create(destination).await?;
        let mut buffer = vec![0u8; self.config.buffer_size];

        debug!("Retrieving chunks from {}", http.url());
        loop {
            let read = match http.read(&mut buffer).await {
                Ok(read) => read,
                Err(e) => {
                    // Whatever arrived stays on disk.
                    if let Err(flush) = file.flush().await {
                        warn!("Could not flush partial file {:?}: {}", destination, flush);
                    }
                    return Err(e);
                }
            };
            if read == 0 {
                break;
            }

            file.write_all(&buffer[..read]).await?;
            progress.advance(read as u64);

            if !on_progress(&progress) {
                file.flush().await?;
                debug!(
                    "Fetch of {} stopped by caller after {} bytes",
                    http.url(),
                    progress.transferred()
                );
                return Ok(FetchOutcome::Cancelled {
                    bytes: progress.transferred(),
                });
            }
        }

        file.flush().await?;
        debug!(
            "Fetched {} bytes from {} into {:?}",
            progress.transferred(),
            http.url(),
            destination
        );

        Ok(FetchOutcome::Completed {
            bytes: progress.transferred(),
        })
    }
}
