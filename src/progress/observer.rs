//! Terminal rendering of config download progress.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vpnconf::progress::{ProgressBarOpts, ProgressObserver};
//! use vpnconf::session::SessionManager;
//!
//! # fn example(session: &SessionManager) {
//! let bar = Arc::new(ProgressObserver::new(ProgressBarOpts::default()));
//! session.subscribe(bar);
//! # }
//! ```

use super::style::ProgressBarOpts;
use crate::error::{Error, Result};
use crate::session::SessionObserver;

use indicatif::ProgressBar;
use std::fmt;

/// A [`SessionObserver`] drawing the download percentage with indicatif.
pub struct ProgressObserver {
    bar: ProgressBar,
    clear: bool,
}

impl fmt::Debug for ProgressObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressObserver")
            .field("position", &self.bar.position())
            .field("clear", &self.clear)
            .finish()
    }
}

impl ProgressObserver {
    pub fn new(opts: ProgressBarOpts) -> Self {
        let clear = opts.clear;
        Self {
            bar: opts.to_progress_bar(100),
            clear,
        }
    }

    /// An observer that keeps track of progress without drawing.
    pub fn hidden() -> Self {
        Self::new(ProgressBarOpts::hidden())
    }

    /// The underlying bar, positioned in percent.
    pub fn bar(&self) -> &ProgressBar {
        &self.bar
    }
}

impl SessionObserver for ProgressObserver {
    fn on_config_download_start(&self) -> Result<()> {
        self.bar.reset();
        self.bar.set_message("Downloading profile");
        Ok(())
    }

    fn on_config_download_progress(&self, percent: u8) -> Result<()> {
        self.bar.set_position(u64::from(percent));
        Ok(())
    }

    fn on_config_download_end(&self) -> Result<()> {
        self.bar.set_position(100);
        if self.clear {
            self.bar.finish_and_clear();
        } else {
            self.bar.finish_with_message("Profile downloaded");
        }
        Ok(())
    }

    fn on_config_download_error(&self, error: &Error) -> Result<()> {
        self.bar.abandon_with_message(format!("Download failed: {}", error));
        Ok(())
    }

    fn on_vpn_status_changed(&self, connected: bool) -> Result<()> {
        let status = if connected { "connected" } else { "disconnected" };
        self.bar.println(format!("VPN {}", status));
        Ok(())
    }
}
