//! Typed JSON values on top of a [`KeyValueStore`].

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::GifawayError;
use crate::services::storage::kv::KeyValueStore;

/// Read and decode the value under `key`.
///
/// Absent, `null`, unreadable and undecodable values all yield `default`.
pub fn load<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str, default: T) -> T {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return default,
        Err(e) => {
            log::warn!("Could not read '{}', using default: {}", key, e);
            return default;
        }
    };
    match serde_json::from_str::<Option<T>>(&raw) {
        Ok(Some(value)) => value,
        Ok(None) => default,
        Err(e) => {
            log::warn!("Discarding undecodable value under '{}': {}", key, e);
            default
        }
    }
}

/// Encode `value` and overwrite whatever is stored under `key`.
pub fn save<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), GifawayError> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}
