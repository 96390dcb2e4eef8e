//! `window.localStorage` backend.
//! Persistent across page reloads; values are stored as UTF-8 text, which
//! covers the JSON documents the session cache writes.

use async_trait::async_trait;
use wasm_bindgen::JsValue;
use web_sys::Storage;

use classroom_core::ports::StoragePort;
use classroom_types::{DirectoryError, Result};

pub struct LocalStorageBackend {
    storage: Storage,
}

impl LocalStorageBackend {
    pub fn open() -> Result<Self> {
        let window = web_sys::window()
            .ok_or_else(|| DirectoryError::Storage("No window object".to_string()))?;
        let storage = window
            .local_storage()
            .map_err(js_err)?
            .ok_or_else(|| DirectoryError::Storage("localStorage not available".to_string()))?;
        Ok(Self { storage })
    }
}

#[async_trait(?Send)]
impl StoragePort for LocalStorageBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let item = self.storage.get_item(key).map_err(js_err)?;
        Ok(item.map(String::into_bytes))
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let text = std::str::from_utf8(value).map_err(|_| {
            DirectoryError::Storage(format!("'{}': localStorage holds text only", key))
        })?;
        // Throws QuotaExceededError when the origin's budget is spent
        self.storage.set_item(key, text).map_err(js_err)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.storage.remove_item(key).map_err(js_err)
    }

    fn backend_name(&self) -> &str {
        "localstorage"
    }
}

fn js_err(e: JsValue) -> DirectoryError {
    DirectoryError::Storage(format!("{:?}", e))
}
