//! Interface of the external connection engine.

use crate::error::Result;

use async_trait::async_trait;
use std::path::Path;
use tokio::sync::broadcast;

/// Status events emitted by a [`ConnectionEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    /// The engine finished parsing the profile it was started with.
    ProfileLoaded(bool),
    Connected,
    Disconnected,
    AuthFailed,
}

/// The component establishing the tunnel once a profile is downloaded.
///
/// The session manager subscribes to [`ConnectionEngine::subscribe`] once,
/// when it is built, and translates every event for its own observers.
#[async_trait]
pub trait ConnectionEngine: Send + Sync {
    /// Load the profile at `profile` and start connecting.
    async fn start(&self, profile: &Path) -> Result<()>;

    /// Tear the connection down. Stopping an idle engine is not an error.
    async fn stop(&self) -> Result<()>;

    /// Stream of status events.
    fn subscribe(&self) -> broadcast::Receiver<EngineEvent>;
}
