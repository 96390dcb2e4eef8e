//! In-memory storage backend.
//! Fastest option but not persistent across page reloads. An optional byte
//! quota mimics the browser's storage limit.

use std::cell::RefCell;
use std::collections::HashMap;
use async_trait::async_trait;
use classroom_core::ports::StoragePort;
use classroom_types::{DirectoryError, Result};

pub struct MemoryStorage {
    data: RefCell<HashMap<String, Vec<u8>>>,
    quota_bytes: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            data: RefCell::new(HashMap::new()),
            quota_bytes: None,
        }
    }

    /// Rejects writes that would push the total of keys and values past `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            data: RefCell::new(HashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    pub fn used_bytes(&self) -> usize {
        self.data
            .borrow()
            .iter()
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl StoragePort for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.data.borrow().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        if let Some(quota) = self.quota_bytes {
            let replaced = self
                .data
                .borrow()
                .get(key)
                .map(|old| key.len() + old.len())
                .unwrap_or(0);
            let projected = self.used_bytes() - replaced + key.len() + value.len();
            if projected > quota {
                return Err(DirectoryError::Storage(format!(
                    "quota of {} bytes exceeded writing '{}'",
                    quota, key
                )));
            }
        }
        self.data
            .borrow_mut()
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.data.borrow_mut().remove(key);
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}
