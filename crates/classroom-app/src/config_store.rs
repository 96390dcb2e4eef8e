//! Persisted directory configuration.
//!
//! The stored JSON document is overlaid with the overrides passed at boot,
//! so a page can pin e.g. `apiBase` without losing other saved settings.

use serde_json::Value;

use classroom_core::ports::StoragePort;
use classroom_types::config::DirectoryConfig;
use classroom_types::{DirectoryError, Result};

pub const CONFIG_STORAGE_KEY: &str = "classroom:config";

/// Restore config from storage and apply `overrides`.
pub async fn load_config(storage: &dyn StoragePort, overrides: &Value) -> Result<DirectoryConfig> {
    let stored = match storage.get(CONFIG_STORAGE_KEY).await {
        Ok(stored) => stored,
        Err(e) => {
            log::warn!("Could not read stored config: {}", e);
            None
        }
    };
    resolve_config(stored.as_deref(), overrides)
}

/// Save config (failures are logged, not surfaced)
pub async fn save_config(storage: &dyn StoragePort, config: &DirectoryConfig) {
    match serde_json::to_vec(config) {
        Ok(json) => match storage.set(CONFIG_STORAGE_KEY, &json).await {
            Ok(()) => log::info!("Config saved to storage"),
            Err(e) => log::warn!("Config not saved: {}", e),
        },
        Err(e) => log::warn!("Config not serializable: {}", e),
    }
}

/// Overlay `overrides` onto the stored document and validate the result.
///
/// A stored document that no longer parses is discarded in favour of the
/// defaults; invalid overrides are an error.
pub fn resolve_config(stored: Option<&[u8]>, overrides: &Value) -> Result<DirectoryConfig> {
    if let Some(bytes) = stored {
        match serde_json::from_slice::<Value>(bytes) {
            Ok(base) if base.is_object() => match build(base, overrides) {
                Ok(config) => {
                    log::info!("Config restored from storage");
                    return Ok(config);
                }
                Err(e) => log::warn!("Stored config rejected ({}), using defaults", e),
            },
            _ => log::warn!("Stored config unreadable, using defaults"),
        }
    }
    build(Value::Object(Default::default()), overrides)
}

fn build(mut base: Value, overrides: &Value) -> Result<DirectoryConfig> {
    overlay(&mut base, overrides);
    let config: DirectoryConfig =
        serde_json::from_value(base).map_err(|e| DirectoryError::Config(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

/// Recursive object merge; `null` leaves the base value untouched.
fn overlay(base: &mut Value, patch: &Value) {
    match (base, patch) {
        (_, Value::Null) => {}
        (Value::Object(base), Value::Object(patch)) => {
            for (key, value) in patch {
                overlay(base.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
        (base, patch) => *base = patch.clone(),
    }
}
