//! States of a configuration session.

use std::fmt;

/// Where a session currently is in its config-then-connect sequence.
///
/// ```text
/// Idle -> ProfileLoading -> ConfigDownloading -> Connecting -> Connected | AuthFailed -> Disconnected
/// ```
///
/// A failed or cancelled download returns to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    #[default]
    Idle,
    ProfileLoading,
    ConfigDownloading,
    Connecting,
    Connected,
    AuthFailed,
    Disconnected,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Idle => "idle",
            SessionState::ProfileLoading => "profile-loading",
            SessionState::ConfigDownloading => "config-downloading",
            SessionState::Connecting => "connecting",
            SessionState::Connected => "connected",
            SessionState::AuthFailed => "auth-failed",
            SessionState::Disconnected => "disconnected",
        };
        f.write_str(s)
    }
}

/// Connection status as last reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    ProfileLoading,
    Connected,
    AuthFailed,
}

impl ConnectionStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionStatus::Connected)
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::ProfileLoading => "profile-loading",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::AuthFailed => "auth-failed",
        };
        f.write_str(s)
    }
}
