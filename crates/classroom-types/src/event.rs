use serde::{Deserialize, Serialize};

/// Events emitted by the session directory.
/// Presentation layers drain these to refresh admin and student views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DirectoryEvent {
    /// The remote store confirmed a new session
    SessionScheduled { id: String },

    /// A session was removed from the local view
    SessionDeleted { id: String },

    /// The remote delete failed after local removal; retried later
    RemoteDeleteFailed { id: String, message: String },

    /// A listing was served from the cache because the remote failed
    ListingDegraded { reason: String },

    /// The best-effort join analytics call failed
    JoinRecordFailed { id: String, message: String },

    /// The persisted cache could not be read and was reset to empty
    CacheRecovered { key: String },
}
