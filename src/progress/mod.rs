//! Progress bar rendering of session events.
//!
//! - `style` - [`ProgressBarOpts`], the bar template and characters
//! - `observer` - [`ProgressObserver`], a session observer drawing the bar
//!
//! # Hidden Progress Bars
//!
//! ```rust
//! use vpnconf::progress::ProgressObserver;
//! use vpnconf::session::SessionObserver;
//!
//! let observer = ProgressObserver::hidden();
//! observer.on_config_download_progress(40).unwrap();
//! assert_eq!(observer.bar().position(), 40);
//! ```

pub(crate) mod observer;
pub(crate) mod style;

pub use observer::ProgressObserver;
pub use style::ProgressBarOpts;
