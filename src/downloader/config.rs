//! Configuration structures and defaults for the downloader.

use crate::http::HttpClientConfig;

/// Size of the buffer each read fills before the chunk is written out.
pub const DEFAULT_BUFFER_SIZE: usize = 65535;

/// Configuration structure for the downloader
#[derive(Debug, Clone)]
pub struct DownloaderConfig {
    /// Read buffer size in bytes.
    pub buffer_size: usize,
    /// HTTP client settings.
    pub http: HttpClientConfig,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            http: HttpClientConfig::default(),
        }
    }
}
