//! Where an artifact comes from.
//!
//! # Example
//!
//! ```rust
//! use vpnconf::download::Source;
//!
//! let remote = Source::parse("https://example.com/config.ovpn")?;
//! assert!(remote.is_remote());
//!
//! let local = Source::parse("/etc/openvpn/client.ovpn")?;
//! assert!(!local.is_remote());
//! # Ok::<(), vpnconf::Error>(())
//! ```

use crate::error::{Error, Result};
use crate::http::normalize_url;

use reqwest::Url;
use std::convert::TryFrom;
use std::fmt;
use std::path::{Path, PathBuf};

/// A remote URL, fetched over HTTP, or a local file, copied as is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Remote(Url),
    Local(PathBuf),
}

impl Source {
    /// Classify `value` as a local path or a remote URL.
    ///
    /// `file:` URLs, absolute paths and paths that exist on disk are local.
    /// Everything else is parsed as a URL, so a scheme-less endpoint such as
    /// `example.com/config.ovpn` fails with [`Error::MalformedUrl`].
    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim();

        if value.starts_with("file:") {
            let url = Url::parse(value)
                .map_err(|e| Error::MalformedUrl(format!("\"{}\": {}", value, e)))?;
            return url
                .to_file_path()
                .map(Source::Local)
                .map_err(|_| Error::MalformedUrl(format!("\"{}\" is not a file path", value)));
        }

        let path = Path::new(value);
        if path.is_absolute() || path.exists() {
            return Ok(Source::Local(PathBuf::from(value)));
        }

        normalize_url(value).map(Source::Remote)
    }

    /// Whether fetching this source involves the network.
    pub fn is_remote(&self) -> bool {
        matches!(self, Source::Remote(_))
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Remote(url) => write!(f, "{}", url),
            Source::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

impl TryFrom<&str> for Source {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Source::parse(value)
    }
}
