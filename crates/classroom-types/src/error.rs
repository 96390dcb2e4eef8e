use thiserror::Error;

/// Client-side pre-flight failures. Never reach the network.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Unsupported duration: {0} minutes")]
    InvalidDuration(u32),

    #[error("Meeting link is empty")]
    InvalidLink,

    #[error("Start time is not a valid instant: {0}")]
    InvalidStartTime(String),
}

#[derive(Error, Debug, Clone)]
pub enum DirectoryError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Rejected by server: {0}")]
    RemoteRejected(String),

    #[error("Session not found: {0}")]
    NotFound(String),

    #[error("Session {0} has no meeting link")]
    MissingLink(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JS interop error: {0}")]
    JsInterop(String),
}

impl DirectoryError {
    /// Remote unreachable, including timer expiry.
    pub fn is_network(&self) -> bool {
        matches!(self, DirectoryError::Network(_) | DirectoryError::Timeout(_))
    }
}

impl From<serde_json::Error> for DirectoryError {
    fn from(e: serde_json::Error) -> Self {
        DirectoryError::Serialization(e.to_string())
    }
}
