//! Observer interface of the session manager.

use crate::error::{Error, Result};

use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::warn;

/// Receives the session's profile, connection and download events.
///
/// Every callback has a no-op default. A callback returning an error is
/// logged by the session manager; a failing
/// [`on_config_download_progress`](SessionObserver::on_config_download_progress)
/// also stops the running download.
///
/// Callbacks run on the session's background job and should return quickly.
pub trait SessionObserver: Send + Sync {
    fn on_profile_loaded(&self, _loaded: bool) -> Result<()> {
        Ok(())
    }

    fn on_vpn_status_changed(&self, _connected: bool) -> Result<()> {
        Ok(())
    }

    fn on_config_download_start(&self) -> Result<()> {
        Ok(())
    }

    /// `percent` is in `0..=100` and never decreases within one download.
    fn on_config_download_progress(&self, _percent: u8) -> Result<()> {
        Ok(())
    }

    fn on_config_download_end(&self) -> Result<()> {
        Ok(())
    }

    fn on_config_download_error(&self, _error: &Error) -> Result<()> {
        Ok(())
    }
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
pub(crate) struct Observers {
    next_id: AtomicU64,
    entries: RwLock<Vec<(SubscriptionId, Arc<dyn SessionObserver>)>>,
}

impl Observers {
    pub(crate) fn subscribe(&self, observer: Arc<dyn SessionObserver>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries.write().push((id, observer));
        id
    }

    pub(crate) fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|(entry, _)| *entry != id);
        entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Deliver `event` to every observer. Returns false if any of them failed.
    ///
    /// The list is snapshotted first so callbacks may (un)subscribe.
    pub(crate) fn notify<F>(&self, event: &str, deliver: F) -> bool
    where
        F: Fn(&dyn SessionObserver) -> Result<()>,
    {
        let snapshot: Vec<_> = self.entries.read().iter().cloned().collect();
        let mut all_ok = true;
        for (id, observer) in snapshot {
            if let Err(e) = deliver(observer.as_ref()) {
                warn!("Observer {:?} failed on {}: {}", id, event, e);
                all_ok = false;
            }
        }
        all_ok
    }
}
