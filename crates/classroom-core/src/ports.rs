//! Port traits: the hexagonal architecture boundary.
//!
//! These traits are defined here in `classroom-core` (pure Rust).
//! Implementations live in `classroom-platform` (browser adapters).
//! The core never imports platform code; it only depends on these traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use classroom_types::{session::SessionRecord, Result};

// ─── Remote Session Store Port ───────────────────────────────

/// Authoritative backend for live-class sessions.
///
/// Every call is a suspension point and may fail with
/// `DirectoryError::Network`, `DirectoryError::Timeout` or
/// `DirectoryError::RemoteRejected`.
#[async_trait(?Send)]
pub trait RemoteSessionStore {
    /// Upcoming sessions, ascending by start time
    async fn list_upcoming(&self) -> Result<Vec<SessionRecord>>;

    /// Sessions currently live
    async fn list_live(&self) -> Result<Vec<SessionRecord>>;

    /// Create a session. The server assigns the final id and echoes back
    /// every field, filling server-side defaults.
    async fn create(&self, draft: &SessionRecord) -> Result<SessionRecord>;

    /// Delete by id. `DirectoryError::NotFound` when the id is unknown.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Analytics ping for a join. Best-effort.
    async fn record_join(&self, id: &str) -> Result<()>;

    /// Name of this backend (for logging/debug)
    fn backend_name(&self) -> &str;
}

// ─── Storage Port ────────────────────────────────────────────

#[async_trait(?Send)]
pub trait StoragePort {
    /// Get a value by key
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Set a value
    async fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Delete a value
    async fn delete(&self, key: &str) -> Result<()>;

    /// Name of this backend (for logging/debug)
    fn backend_name(&self) -> &str;
}

// ─── Clock Port ──────────────────────────────────────────────

/// Source of the current instant. Injected so status derivation is testable.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

// ─── Link Opener Port ────────────────────────────────────────

/// Opens an external URL in a new browsing context.
pub trait LinkOpener {
    fn open(&self, url: &str) -> Result<()>;
}
