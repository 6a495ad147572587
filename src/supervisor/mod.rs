//! Supervision of concurrent work per named session.
//!
//! - [`registry`] - [`TaskSupervisor`], the named scope registry
//! - [`pending`] - [`PendingJobs`], jobs detached by a cancel or a removal

pub mod pending;
pub mod registry;

pub use pending::PendingJobs;
pub use registry::TaskSupervisor;
