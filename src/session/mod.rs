//! Session state machine sequencing config download and connection.
//!
//! - `manager` - [`SessionManager`], the state machine itself
//! - `builder` - [`SessionManagerBuilder`]
//! - `config` - [`SessionConfig`] and its defaults
//! - `engine` - the [`ConnectionEngine`] interface and its [`EngineEvent`]s
//! - `observer` - the [`SessionObserver`] callback interface
//! - `settings` - [`SettingsStore`] and the in-memory [`MemorySettings`]
//! - `connectivity` - the [`Connectivity`] probe
//! - `profile` - sanity check of a downloaded profile
//! - `state` - [`SessionState`] and [`ConnectionStatus`]

pub mod builder;
pub mod config;
pub mod connectivity;
pub mod engine;
pub mod manager;
pub mod observer;
pub mod profile;
pub mod settings;
pub mod state;

pub use builder::SessionManagerBuilder;
pub use config::SessionConfig;
pub use connectivity::{AlwaysOnline, Connectivity};
pub use engine::{ConnectionEngine, EngineEvent};
pub use manager::{SessionManager, CONFIG_SESSION, ENGINE_SESSION};
pub use observer::{SessionObserver, SubscriptionId};
pub use profile::validate_profile;
pub use settings::{MemorySettings, SettingsStore};
pub use state::{ConnectionStatus, SessionState};
