//! Network availability probe consulted before a download starts.

/// Reports whether a network is currently usable.
pub trait Connectivity: Send + Sync {
    fn is_available(&self) -> bool;
}

/// Probe that always reports a network.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysOnline;

impl Connectivity for AlwaysOnline {
    fn is_available(&self) -> bool {
        true
    }
}
