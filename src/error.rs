//! Error handling for vpnconf.
//!
//! Every failure of the fetch client, the downloader, the task supervisor and
//! the session manager travels through the single [`Error`] enum. Callers that
//! only care about the broad category can use [`Error::kind`].

use reqwest::StatusCode;
use std::io;
use thiserror::Error;

/// Errors that can happen when using vpnconf.
#[derive(Error, Debug)]
pub enum Error {
    /// Error from an underlying system.
    ///
    /// Captures failures that don't fit into other categories, such as a
    /// middleware error raised by the HTTP stack.
    #[error("Internal error: {0}")]
    Internal(String),

    /// The URL cannot be parsed, even after normalization, or uses a scheme
    /// other than HTTP(S).
    #[error("Malformed URL: {0}")]
    MalformedUrl(String),

    /// The server kept redirecting (or throttling) past the allowed number
    /// of iterations.
    #[error("Too many redirects while connecting to {url}")]
    TooManyRedirects {
        /// Last URL that was requested.
        url: String,
    },

    /// The final response status was neither `200 OK` nor `206 Partial Content`.
    #[error("HTTP error from {url}: {status}")]
    Http {
        /// URL that produced the response.
        url: String,
        /// Status code, displayed with its canonical reason.
        status: StatusCode,
    },

    /// I/O Error.
    ///
    /// Wraps failures while reading the response stream, decoding gzip, or
    /// writing the artifact to disk.
    #[error("I/O error")]
    IOError {
        #[from]
        source: io::Error,
    },

    /// Error from the Reqwest library.
    ///
    /// Connection failures, timeouts and broken transfers end up here.
    #[error("Reqwest Error")]
    Reqwest {
        #[from]
        source: reqwest::Error,
    },

    /// The downloaded artifact is not a usable profile.
    #[error("Invalid profile: {0}")]
    ConfigParse(String),

    /// No network became available before the download could start.
    #[error("No network available")]
    NoNetwork,

    /// `read` was called on a client that is not connected.
    #[error("Not connected")]
    NotConnected,

    /// `join` was called from one of the jobs it would wait for.
    #[error("Cannot join session \"{0}\" from one of its own jobs")]
    JoinFromWithin(String),

    /// An observer callback reported a failure.
    #[error("Observer error: {0}")]
    Observer(String),
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MalformedUrl,
    TooManyRedirects,
    Http,
    Io,
    ConfigParse,
    NoNetwork,
    Internal,
}

impl Error {
    /// Returns the category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MalformedUrl(_) => ErrorKind::MalformedUrl,
            Error::TooManyRedirects { .. } => ErrorKind::TooManyRedirects,
            Error::Http { .. } => ErrorKind::Http,
            Error::IOError { .. } | Error::Reqwest { .. } | Error::NotConnected => ErrorKind::Io,
            Error::ConfigParse(_) => ErrorKind::ConfigParse,
            Error::NoNetwork => ErrorKind::NoNetwork,
            Error::Internal(_) | Error::JoinFromWithin(_) | Error::Observer(_) => {
                ErrorKind::Internal
            }
        }
    }
}

impl From<reqwest_middleware::Error> for Error {
    fn from(err: reqwest_middleware::Error) -> Self {
        match err {
            reqwest_middleware::Error::Reqwest(source) => Error::Reqwest { source },
            reqwest_middleware::Error::Middleware(e) => Error::Internal(e.to_string()),
        }
    }
}

/// Result type alias for operations that can fail with a vpnconf error.
pub type Result<T> = std::result::Result<T, Error>;
