//! Builder for [`SessionManager`].
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vpnconf::session::{ConnectionEngine, SessionManagerBuilder};
//!
//! # async fn example(engine: Arc<dyn ConnectionEngine>) -> vpnconf::Result<()> {
//! let session = SessionManagerBuilder::new(engine)
//!     .artifact_path("/var/lib/vpnconf/config.ovpn")
//!     .discard_partial(true)
//!     .build()?;
//! session
//!     .configure(true, Some("https://10.0.0.1/config.ovpn"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

use super::config::SessionConfig;
use super::connectivity::{AlwaysOnline, Connectivity};
use super::engine::ConnectionEngine;
use super::manager::{Inner, SessionManager};
use super::observer::Observers;
use super::settings::{MemorySettings, SettingsStore};
use super::state::{ConnectionStatus, SessionState};
use crate::downloader::{Downloader, DownloaderBuilder};
use crate::error::{Error, Result};
use crate::supervisor::TaskSupervisor;

use parking_lot::Mutex;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;

/// A builder used to create a [`SessionManager`].
pub struct SessionManagerBuilder {
    engine: Arc<dyn ConnectionEngine>,
    config: SessionConfig,
    settings: Option<Arc<dyn SettingsStore>>,
    connectivity: Option<Arc<dyn Connectivity>>,
    downloader: Option<Downloader>,
    runtime: Option<Handle>,
}

impl fmt::Debug for SessionManagerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManagerBuilder")
            .field("config", &self.config)
            .field("downloader", &self.downloader)
            .finish_non_exhaustive()
    }
}

impl SessionManagerBuilder {
    /// Creates a builder driving `engine`, with the default options.
    pub fn new(engine: Arc<dyn ConnectionEngine>) -> Self {
        Self {
            engine,
            config: SessionConfig::default(),
            settings: None,
            connectivity: None,
            downloader: None,
            runtime: None,
        }
    }

    /// Set where the downloaded profile is written.
    pub fn artifact_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.artifact_path = path.into();
        self
    }

    /// Use `settings` to persist the endpoint and enabled flag.
    ///
    /// Defaults to [`MemorySettings`].
    pub fn settings(mut self, settings: Arc<dyn SettingsStore>) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Probe consulted before each download. Defaults to [`AlwaysOnline`].
    pub fn connectivity(mut self, connectivity: Arc<dyn Connectivity>) -> Self {
        self.connectivity = Some(connectivity);
        self
    }

    /// Poll for a network `attempts` times, `interval` apart, before failing
    /// with `NoNetwork`.
    pub fn network_wait(mut self, attempts: u32, interval: Duration) -> Self {
        self.config.network_wait_attempts = attempts.max(1);
        self.config.network_wait_interval = interval;
        self
    }

    /// Delete the artifact when a download fails.
    pub fn discard_partial(mut self, discard: bool) -> Self {
        self.config.discard_partial = discard;
        self
    }

    /// Fetch profiles with `downloader` instead of a default one.
    pub fn downloader(mut self, downloader: Downloader) -> Self {
        self.downloader = Some(downloader);
        self
    }

    /// Run background jobs on `handle` instead of the current runtime.
    pub fn runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    /// Create the [`SessionManager`] and wire the engine's status stream.
    ///
    /// Fails if no runtime was given and none is running.
    pub fn build(self) -> Result<SessionManager> {
        let runtime = match self.runtime {
            Some(handle) => handle,
            None => Handle::try_current()
                .map_err(|e| Error::Internal(format!("no tokio runtime: {}", e)))?,
        };
        let downloader = match self.downloader {
            Some(downloader) => downloader,
            None => DownloaderBuilder::new().build()?,
        };

        let inner = Inner {
            config: self.config,
            downloader,
            tasks: TaskSupervisor::with_handle(runtime),
            engine: self.engine,
            settings: self
                .settings
                .unwrap_or_else(|| Arc::new(MemorySettings::new())),
            connectivity: self.connectivity.unwrap_or_else(|| Arc::new(AlwaysOnline)),
            observers: Observers::default(),
            state: Mutex::new(SessionState::Idle),
            status: Mutex::new(ConnectionStatus::Disconnected),
        };
        Ok(SessionManager::start(inner))
    }
}
