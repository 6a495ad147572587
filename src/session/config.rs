//! Configuration of a [`SessionManager`](super::SessionManager).

use std::path::PathBuf;
use std::time::Duration;

/// File name of the artifact when no path is configured.
pub const DEFAULT_ARTIFACT_NAME: &str = "config.ovpn";

/// Number of connectivity polls before giving up with `NoNetwork`.
pub const DEFAULT_NETWORK_WAIT_ATTEMPTS: u32 = 60;

/// Pause between two connectivity polls.
pub const DEFAULT_NETWORK_WAIT_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Where the downloaded profile is written.
    pub artifact_path: PathBuf,
    pub network_wait_attempts: u32,
    pub network_wait_interval: Duration,
    /// Delete the artifact when a download fails instead of leaving the partial file.
    pub discard_partial: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            artifact_path: dir.join(DEFAULT_ARTIFACT_NAME),
            network_wait_attempts: DEFAULT_NETWORK_WAIT_ATTEMPTS,
            network_wait_interval: DEFAULT_NETWORK_WAIT_INTERVAL,
            discard_partial: false,
        }
    }
}
