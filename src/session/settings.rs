//! Persisted session preferences.

use parking_lot::RwLock;

/// Key-value store holding the desired endpoint and the enabled flag.
///
/// Storage is up to the host application; [`MemorySettings`] keeps the
/// values in memory only.
pub trait SettingsStore: Send + Sync {
    fn endpoint(&self) -> Option<String>;
    fn set_endpoint(&self, endpoint: &str);
    fn is_enabled(&self) -> bool;
    fn set_enabled(&self, enabled: bool);
}

#[derive(Debug, Default)]
pub struct MemorySettings {
    endpoint: RwLock<Option<String>>,
    enabled: RwLock<bool>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettings {
    fn endpoint(&self) -> Option<String> {
        self.endpoint.read().clone()
    }

    fn set_endpoint(&self, endpoint: &str) {
        *self.endpoint.write() = Some(endpoint.to_string());
    }

    fn is_enabled(&self) -> bool {
        *self.enabled.read()
    }

    fn set_enabled(&self, enabled: bool) {
        *self.enabled.write() = enabled;
    }
}
