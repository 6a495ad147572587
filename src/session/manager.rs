//! The config-then-connect session state machine.
//!
//! [`SessionManager::configure`] launches one background job under the
//! [`CONFIG_SESSION`] scope. The job waits for a network, downloads the
//! profile, validates it and hands its path to the [`ConnectionEngine`].
//! Engine status events are translated by a second job under
//! [`ENGINE_SESSION`], wired when the manager is built.
//!
//! Observers hear about a configure cycle in this order:
//!
//! ```text
//! on_config_download_start
//! on_config_download_progress (0..n times, never decreasing)
//! on_config_download_end | on_config_download_error (at most one of them)
//! ```
//!
//! A cancelled cycle ends silently after the start event.

use super::config::SessionConfig;
use super::connectivity::Connectivity;
use super::engine::{ConnectionEngine, EngineEvent};
use super::observer::{Observers, SessionObserver, SubscriptionId};
use super::profile::validate_profile;
use super::settings::SettingsStore;
use super::state::{ConnectionStatus, SessionState};
use crate::download::FetchOutcome;
use crate::downloader::Downloader;
use crate::error::{Error, Result};
use crate::supervisor::{PendingJobs, TaskSupervisor};

use parking_lot::Mutex;
use std::fmt;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::{Arc, Weak};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::{fs, time};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Scope of the config download job.
pub const CONFIG_SESSION: &str = "config-download";

/// Scope of the engine status translator.
pub const ENGINE_SESSION: &str = "engine-status";

/// Drives profile download and the connection engine for one artifact path.
///
/// Built with [`SessionManagerBuilder`](super::SessionManagerBuilder).
/// Dropping the manager cancels its background jobs.
pub struct SessionManager {
    inner: Arc<Inner>,
}

pub(crate) struct Inner {
    pub(crate) config: SessionConfig,
    pub(crate) downloader: Downloader,
    pub(crate) tasks: TaskSupervisor,
    pub(crate) engine: Arc<dyn ConnectionEngine>,
    pub(crate) settings: Arc<dyn SettingsStore>,
    pub(crate) connectivity: Arc<dyn Connectivity>,
    pub(crate) observers: Observers,
    pub(crate) state: Mutex<SessionState>,
    pub(crate) status: Mutex<ConnectionStatus>,
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("config", &self.inner.config)
            .field("state", &*self.inner.state.lock())
            .field("status", &*self.inner.status.lock())
            .field("observers", &self.inner.observers.len())
            .finish()
    }
}

impl SessionManager {
    /// Wraps `inner` and starts translating engine events.
    pub(crate) fn start(inner: Inner) -> Self {
        let events = inner.engine.subscribe();
        let inner = Arc::new(inner);
        let weak = Arc::downgrade(&inner);
        inner.tasks.launch(ENGINE_SESSION, move |token| {
            translate_engine_events(weak, events, token)
        });
        Self { inner }
    }

    /// Enable or disable the session.
    ///
    /// Enabling stores `endpoint` (or reuses the stored one) and starts a
    /// new download cycle, replacing any cycle still running. It returns as
    /// soon as the cycle is launched; its outcome reaches the observers.
    ///
    /// Disabling cancels a running download and waits for it before stopping
    /// the engine, so the engine never opens a half-written profile.
    pub async fn configure(&self, enabled: bool, endpoint: Option<&str>) -> Result<()> {
        if !enabled {
            return self.disable().await;
        }

        let endpoint = match endpoint {
            Some(endpoint) => endpoint.to_string(),
            None => self
                .inner
                .settings
                .endpoint()
                .ok_or_else(|| Error::MalformedUrl("no endpoint configured".into()))?,
        };
        self.save_info(&endpoint, true);

        info!("Configuring session from {}", endpoint);
        let inner = Arc::clone(&self.inner);
        self.inner.tasks.relaunch(CONFIG_SESSION, move |token| {
            inner.run_config_cycle(endpoint, token)
        });
        Ok(())
    }

    async fn disable(&self) -> Result<()> {
        info!("Disabling session");
        self.inner.settings.set_enabled(false);
        self.inner.tasks.remove(CONFIG_SESSION).wait().await;

        let stopped = self.inner.engine.stop().await;
        if let Err(e) = &stopped {
            error!("Engine failed to stop: {}", e);
        }
        self.inner.set_status(ConnectionStatus::Disconnected);
        self.inner.set_state(SessionState::Disconnected);
        stopped
    }

    /// Cancel the running download. It stops at its next chunk.
    pub fn cancel(&self) -> PendingJobs {
        self.inner.tasks.cancel(CONFIG_SESSION)
    }

    /// Wait for the current download cycle to finish.
    pub async fn join(&self) -> Result<()> {
        self.inner.tasks.join(CONFIG_SESSION).await
    }

    /// Cancel every background job and wait for them. The engine is left alone.
    pub async fn shutdown(&self) {
        self.inner.tasks.shutdown().await;
    }

    pub fn state(&self) -> SessionState {
        *self.inner.state.lock()
    }

    pub fn status(&self) -> ConnectionStatus {
        *self.inner.status.lock()
    }

    pub fn is_connected(&self) -> bool {
        self.status().is_connected()
    }

    /// Whether the session was last configured as enabled.
    pub fn is_enabled(&self) -> bool {
        self.inner.settings.is_enabled()
    }

    /// The stored endpoint, if any.
    pub fn endpoint(&self) -> Option<String> {
        self.inner.settings.endpoint()
    }

    /// Store the endpoint and enabled flag without starting anything.
    pub fn save_info(&self, endpoint: &str, enabled: bool) {
        self.inner.settings.set_endpoint(endpoint);
        self.inner.settings.set_enabled(enabled);
    }

    pub fn artifact_path(&self) -> &Path {
        &self.inner.config.artifact_path
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    pub fn subscribe(&self, observer: Arc<dyn SessionObserver>) -> SubscriptionId {
        self.inner.observers.subscribe(observer)
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.observers.unsubscribe(id)
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.inner.tasks.remove(CONFIG_SESSION);
        self.inner.tasks.remove(ENGINE_SESSION);
    }
}

impl Inner {
    fn set_state(&self, next: SessionState) {
        let mut state = self.state.lock();
        if *state != next {
            debug!("Session state {} -> {}", *state, next);
            *state = next;
        }
    }

    fn set_status(&self, next: ConnectionStatus) {
        let mut status = self.status.lock();
        if *status != next {
            debug!("Connection status {} -> {}", *status, next);
            *status = next;
        }
    }

    async fn run_config_cycle(self: Arc<Self>, endpoint: String, token: CancellationToken) {
        if token.is_cancelled() {
            return;
        }

        self.set_state(SessionState::ProfileLoading);
        self.observers
            .notify("config download start", |o| o.on_config_download_start());

        match self.wait_for_network(&token).await {
            Ok(true) => (),
            Ok(false) => {
                debug!("Config download cancelled while waiting for a network");
                self.set_state(SessionState::Idle);
                return;
            }
            Err(e) => return self.fail(e).await,
        }

        self.set_state(SessionState::ConfigDownloading);
        let path = self.config.artifact_path.clone();
        let mut last_percent = None;
        let mut observer_failed = false;

        // Connecting and 429 backoff never reach the progress callback, so
        // the token is raced against the whole fetch as well.
        let fetch = self.downloader.fetch(&endpoint, &path, |progress| {
            if token.is_cancelled() {
                return false;
            }
            let percent = progress.percent();
            if last_percent == Some(percent) {
                return true;
            }
            last_percent = Some(percent);

            let delivered = self.observers.notify("config download progress", |o| {
                o.on_config_download_progress(percent)
            });
            observer_failed = !delivered;
            delivered
        });
        let outcome = tokio::select! {
            biased;
            _ = token.cancelled() => None,
            outcome = fetch => Some(outcome),
        };

        let outcome = match outcome {
            Some(outcome) => outcome,
            None => {
                info!("Config download of {} cancelled", endpoint);
                self.set_state(SessionState::Idle);
                return;
            }
        };

        match outcome {
            Ok(FetchOutcome::Completed { bytes }) if !token.is_cancelled() => {
                info!("Downloaded {} bytes of profile to {:?}", bytes, path);
                if let Err(e) = validate_profile(&path).await {
                    return self.fail(e).await;
                }
                self.observers
                    .notify("config download end", |o| o.on_config_download_end());
                self.start_engine(&path).await;
            }
            Ok(_) if observer_failed && !token.is_cancelled() => {
                self.fail(Error::Observer("progress observer failed".into()))
                    .await
            }
            Ok(outcome) => {
                info!("Config download cancelled after {} bytes", outcome.bytes());
                self.set_state(SessionState::Idle);
            }
            Err(e) if token.is_cancelled() => {
                debug!("Config download cancelled, dropping error: {}", e);
                self.set_state(SessionState::Idle);
            }
            Err(e) => self.fail(e).await,
        }
    }

    /// Poll the connectivity probe. `Ok(false)` means cancelled.
    async fn wait_for_network(&self, token: &CancellationToken) -> Result<bool> {
        let attempts = self.config.network_wait_attempts.max(1);
        for attempt in 1..=attempts {
            if token.is_cancelled() {
                return Ok(false);
            }
            if self.connectivity.is_available() {
                return Ok(true);
            }
            if attempt == attempts {
                break;
            }

            debug!("No network yet (attempt {}/{})", attempt, attempts);
            tokio::select! {
                _ = token.cancelled() => return Ok(false),
                _ = time::sleep(self.config.network_wait_interval) => (),
            }
        }
        Err(Error::NoNetwork)
    }

    async fn start_engine(&self, path: &Path) {
        self.set_state(SessionState::Connecting);
        if let Err(e) = self.engine.start(path).await {
            error!("Engine failed to start with {:?}: {}", path, e);
            self.set_status(ConnectionStatus::Disconnected);
            self.set_state(SessionState::Disconnected);
            self.observers
                .notify("vpn status", |o| o.on_vpn_status_changed(false));
        }
    }

    async fn fail(&self, error: Error) {
        error!("Config download failed: {}", error);

        if self.config.discard_partial {
            let path = &self.config.artifact_path;
            match fs::remove_file(path).await {
                Ok(()) => debug!("Discarded partial artifact {:?}", path),
                Err(e) if e.kind() == ErrorKind::NotFound => (),
                Err(e) => warn!("Could not discard partial artifact {:?}: {}", path, e),
            }
        }

        self.set_state(SessionState::Idle);
        self.observers
            .notify("config download error", |o| o.on_config_download_error(&error));
    }

    fn handle_engine_event(&self, event: EngineEvent) {
        debug!("Engine event {:?}", event);
        match event {
            EngineEvent::ProfileLoaded(loaded) => {
                if loaded {
                    self.set_status(ConnectionStatus::ProfileLoading);
                } else {
                    self.set_status(ConnectionStatus::Disconnected);
                    self.set_state(SessionState::Disconnected);
                }
                self.observers
                    .notify("profile loaded", |o| o.on_profile_loaded(loaded));
            }
            EngineEvent::Connected => {
                self.set_status(ConnectionStatus::Connected);
                self.set_state(SessionState::Connected);
                self.observers
                    .notify("vpn status", |o| o.on_vpn_status_changed(true));
            }
            EngineEvent::Disconnected => {
                self.set_status(ConnectionStatus::Disconnected);
                self.set_state(SessionState::Disconnected);
                self.observers
                    .notify("vpn status", |o| o.on_vpn_status_changed(false));
            }
            EngineEvent::AuthFailed => {
                self.set_status(ConnectionStatus::AuthFailed);
                self.set_state(SessionState::AuthFailed);
                self.observers
                    .notify("vpn status", |o| o.on_vpn_status_changed(false));
            }
        }
    }
}

async fn translate_engine_events(
    inner: Weak<Inner>,
    mut events: broadcast::Receiver<EngineEvent>,
    token: CancellationToken,
) {
    loop {
        let event = tokio::select! {
            _ = token.cancelled() => break,
            event = events.recv() => event,
        };

        match event {
            Ok(event) => match inner.upgrade() {
                Some(inner) => inner.handle_engine_event(event),
                None => break,
            },
            Err(RecvError::Lagged(missed)) => warn!("Missed {} engine event(s)", missed),
            Err(RecvError::Closed) => {
                debug!("Engine status stream closed");
                break;
            }
        }
    }
}
