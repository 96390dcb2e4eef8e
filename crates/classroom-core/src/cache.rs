//! Local cache mirror: persisted overlay of session records.
//!
//! Mutations apply to the in-memory list immediately; `flush` writes the
//! list back to the storage port as JSON under a single key. A missing or
//! unreadable entry degrades to an empty list. No dedup happens here.

use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::rc::Rc;

use serde::de::DeserializeOwned;

use classroom_types::{session::SessionRecord, Result};
use crate::ports::StoragePort;

pub struct SessionCache {
    storage: Rc<dyn StoragePort>,
    key: String,
    records: RefCell<Vec<SessionRecord>>,
    dirty: Cell<bool>,
    recovered: bool,
}

impl SessionCache {
    /// Read the persisted list under `key`.
    pub async fn open(storage: Rc<dyn StoragePort>, key: &str) -> Self {
        let loaded = read_json::<Vec<SessionRecord>>(storage.as_ref(), key).await;
        let (records, recovered) = match loaded {
            Loaded::Value(records) => (records, false),
            Loaded::Missing => (Vec::new(), false),
            Loaded::Corrupt => (Vec::new(), true),
        };
        log::debug!(
            "Session cache '{}' opened on {} with {} records",
            key,
            storage.backend_name(),
            records.len()
        );
        Self {
            storage,
            key: key.to_string(),
            records: RefCell::new(records),
            dirty: Cell::new(false),
            recovered,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// The persisted entry existed but could not be decoded.
    pub fn was_recovered(&self) -> bool {
        self.recovered
    }

    pub fn load(&self) -> Vec<SessionRecord> {
        self.records.borrow().clone()
    }

    pub fn get(&self, id: &str) -> Option<SessionRecord> {
        self.records.borrow().iter().find(|r| r.id == id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.borrow().iter().any(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }

    pub fn append(&self, record: SessionRecord) {
        self.records.borrow_mut().push(record);
        self.dirty.set(true);
    }

    /// Removes every entry with `id`. Returns whether anything was removed.
    pub fn remove(&self, id: &str) -> bool {
        let mut records = self.records.borrow_mut();
        let before = records.len();
        records.retain(|r| r.id != id);
        let removed = records.len() != before;
        if removed {
            self.dirty.set(true);
        }
        removed
    }

    pub fn save(&self, records: Vec<SessionRecord>) {
        *self.records.borrow_mut() = records;
        self.dirty.set(true);
    }

    /// Persist pending mutations.
    pub async fn flush(&self) -> Result<()> {
        if !self.dirty.get() {
            return Ok(());
        }
        let json = serde_json::to_vec(&*self.records.borrow())?;
        self.storage.set(&self.key, &json).await?;
        self.dirty.set(false);
        Ok(())
    }
}

/// Ids whose local removal has not yet been confirmed by the remote store.
pub struct PendingDeletes {
    storage: Rc<dyn StoragePort>,
    key: String,
    ids: RefCell<BTreeSet<String>>,
}

impl PendingDeletes {
    pub async fn open(storage: Rc<dyn StoragePort>, key: &str) -> Self {
        let ids = match read_json::<BTreeSet<String>>(storage.as_ref(), key).await {
            Loaded::Value(ids) => ids,
            Loaded::Missing | Loaded::Corrupt => BTreeSet::new(),
        };
        Self {
            storage,
            key: key.to_string(),
            ids: RefCell::new(ids),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.borrow().contains(id)
    }

    pub fn ids(&self) -> Vec<String> {
        self.ids.borrow().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.ids.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.borrow().is_empty()
    }

    pub fn insert(&self, id: &str) -> bool {
        self.ids.borrow_mut().insert(id.to_string())
    }

    pub fn remove(&self, id: &str) -> bool {
        self.ids.borrow_mut().remove(id)
    }

    pub async fn flush(&self) -> Result<()> {
        if self.is_empty() {
            return self.storage.delete(&self.key).await;
        }
        let json = serde_json::to_vec(&*self.ids.borrow())?;
        self.storage.set(&self.key, &json).await
    }
}

enum Loaded<T> {
    Value(T),
    Missing,
    Corrupt,
}

async fn read_json<T: DeserializeOwned>(storage: &dyn StoragePort, key: &str) -> Loaded<T> {
    let bytes = match storage.get(key).await {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return Loaded::Missing,
        Err(e) => {
            log::warn!("Reading '{}' from {} failed: {}", key, storage.backend_name(), e);
            return Loaded::Corrupt;
        }
    };
    match serde_json::from_slice(&bytes) {
        Ok(value) => Loaded::Value(value),
        Err(e) => {
            log::warn!("Discarding unreadable '{}': {}", key, e);
            Loaded::Corrupt
        }
    }
}
