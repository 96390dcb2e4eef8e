//! Storage backend selection.
//!
//! Priority for `Auto`: localStorage → Memory (fallback)

use std::rc::Rc;
use classroom_core::ports::StoragePort;
use classroom_types::config::{StorageBackendType, StorageConfig};
use classroom_types::Result;
use super::{LocalStorageBackend, MemoryStorage};

/// Try to open the best available storage backend.
/// Returns a trait object so callers are backend-agnostic.
pub fn auto_detect_storage() -> Rc<dyn StoragePort> {
    match LocalStorageBackend::open() {
        Ok(local) => {
            log::info!("Storage backend: localStorage");
            Rc::new(local)
        }
        Err(e) => {
            log::warn!("localStorage unavailable ({}), falling back to memory", e);
            Rc::new(MemoryStorage::new())
        }
    }
}

/// Open the backend named in `config`. An explicit `LocalStorage` choice
/// fails instead of silently losing persistence.
pub fn open_storage(config: &StorageConfig) -> Result<Rc<dyn StoragePort>> {
    match config.backend {
        StorageBackendType::Auto => Ok(auto_detect_storage()),
        StorageBackendType::Memory => {
            log::info!("Storage backend: memory");
            Ok(Rc::new(MemoryStorage::new()))
        }
        StorageBackendType::LocalStorage => {
            let local = LocalStorageBackend::open()?;
            log::info!("Storage backend: localStorage");
            Ok(Rc::new(local))
        }
    }
}
