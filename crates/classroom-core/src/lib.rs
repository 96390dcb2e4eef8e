//! Live-class session directory core.
//!
//! Platform-free: the remote backend, persisted storage, clock and link
//! opener are reached only through the traits in [`ports`].

pub mod ports;
pub mod event_bus;
pub mod cache;
pub mod reconcile;
pub mod directory;


pub use directory::SessionDirectory;
