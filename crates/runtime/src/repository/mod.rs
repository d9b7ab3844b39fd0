//! Persistence for light runtime state.
//!
//! Stores hold small JSON documents under string keys, such as the menu
//! positions a unit should resume at. Callers go through [`load_object`] and
//! [`save_object`], which never fail: a missing or unreadable value falls
//! back to the type's default and a failed write is only logged.

mod error;
mod file;
mod memory;

pub use error::{RepositoryError, Result};
pub use file::FileObjectStore;
pub use memory::InMemoryObjectStore;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

/// Key-value store for JSON documents.
pub trait ObjectStore: Send + Sync {
    /// Loads the value stored under `key`, if any.
    fn load_value(&self, key: &str) -> Result<Option<Value>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn save_value(&self, key: &str, value: &Value) -> Result<()>;

    /// Removes the value under `key`. Removing a missing key succeeds.
    fn remove(&self, key: &str) -> Result<()>;

    fn contains(&self, key: &str) -> bool {
        matches!(self.load_value(key), Ok(Some(_)))
    }
}

/// Loads and deserializes the value under `key`.
///
/// Returns `T::default()` when the key is missing, the store fails, or the
/// stored value does not deserialize into `T`.
pub fn load_object<T>(store: &dyn ObjectStore, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    let value = match store.load_value(key) {
        Ok(Some(value)) => value,
        Ok(None) => return T::default(),
        Err(error) => {
            warn!(
                target: "runtime::repository",
                key,
                %error,
                "Failed to load object, using default"
            );
            return T::default();
        }
    };

    serde_json::from_value(value).unwrap_or_else(|error| {
        warn!(
            target: "runtime::repository",
            key,
            %error,
            "Stored object has unexpected shape, using default"
        );
        T::default()
    })
}

/// Serializes and stores `value` under `key`.
///
/// Failures are logged and swallowed; returns whether the write succeeded.
pub fn save_object<T>(store: &dyn ObjectStore, key: &str, value: &T) -> bool
where
    T: Serialize + ?Sized,
{
    let result = serde_json::to_value(value)
        .map_err(RepositoryError::from)
        .and_then(|value| store.save_value(key, &value));

    match result {
        Ok(()) => true,
        Err(error) => {
            warn!(target: "runtime::repository", key, %error, "Failed to save object");
            false
        }
    }
}
