use serde::{Deserialize, Serialize};

use crate::error::DirectoryError;
use crate::validation::{SchedulingRules, DEFAULT_DURATIONS};

/// Top-level directory configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    pub api_base: String,
    /// Storage key under which the cache mirror keeps its session list
    pub cache_key: String,
    pub request_timeout_ms: u64,
    pub allowed_durations: Vec<u32>,
    pub default_utc_offset_minutes: i32,
    pub remote: RemoteBackendType,
    pub storage: StorageConfig,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            api_base: "/api".to_string(),
            cache_key: DEFAULT_CACHE_KEY.to_string(),
            request_timeout_ms: 10_000,
            allowed_durations: DEFAULT_DURATIONS.to_vec(),
            default_utc_offset_minutes: 0,
            remote: RemoteBackendType::Http,
            storage: StorageConfig::default(),
        }
    }
}

impl DirectoryConfig {
    pub fn validate(&self) -> Result<(), DirectoryError> {
        if self.remote == RemoteBackendType::Http && self.api_base.trim().is_empty() {
            return Err(DirectoryError::Config("api_base must not be empty".to_string()));
        }
        if self.cache_key.trim().is_empty() {
            return Err(DirectoryError::Config("cache_key must not be empty".to_string()));
        }
        if self.request_timeout_ms == 0 {
            return Err(DirectoryError::Config(
                "request_timeout_ms must be positive".to_string(),
            ));
        }
        if self.allowed_durations.is_empty() || self.allowed_durations.contains(&0) {
            return Err(DirectoryError::Config(
                "allowed_durations must be a non-empty set of positive minutes".to_string(),
            ));
        }
        Ok(())
    }

    pub fn scheduling_rules(&self) -> SchedulingRules {
        SchedulingRules {
            allowed_durations: self.allowed_durations.clone(),
            default_utc_offset_minutes: self.default_utc_offset_minutes,
        }
    }

    /// Storage key for ids whose remote delete has not been confirmed.
    pub fn pending_deletes_key(&self) -> String {
        format!("{}:pending-deletes", self.cache_key)
    }
}

pub const DEFAULT_CACHE_KEY: &str = "classroom:live-classes";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemoteBackendType {
    /// REST backend reached with `fetch`
    Http,
    /// In-process store, for demos and offline development
    Memory,
}

impl RemoteBackendType {
    pub fn label(&self) -> &str {
        match self {
            RemoteBackendType::Http => "HTTP",
            RemoteBackendType::Memory => "In-memory",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackendType,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackendType::Auto,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageBackendType {
    /// Auto-detect best available backend
    Auto,
    Memory,
    LocalStorage,
}
