use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{error, warn};

use super::store::KeyValueStore;

pub const PROBE_KEY: &str = "__storage_test__";

/// JSON view over a [`KeyValueStore`]. Probes availability once at construction; afterwards
/// every operation degrades to a `false`/`None` result instead of failing.
pub struct StorageManager<S> {
    store: S,
    available: bool,
}

impl<S: KeyValueStore> StorageManager<S> {
    pub fn new(mut store: S) -> Self {
        let available = probe(&mut store);
        Self { store, available }
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn set_item<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> bool {
        if !self.available {
            return false;
        }

        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(err) => {
                error!(key, error = %err, "failed to serialize stored value");
                return false;
            }
        };

        match self.store.set(key, &raw) {
            Ok(()) => true,
            Err(err) => {
                error!(key, error = %err, "failed to save to store");
                false
            }
        }
    }

    pub fn get_item<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        if !self.available {
            return None;
        }

        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                error!(key, error = %err, "failed to read from store");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                error!(key, error = %err, "stored value is not valid json");
                None
            }
        }
    }

    /// Removes only the given keys; anything else in the store is left alone.
    pub fn clear(&mut self, keys: &[&str]) -> bool {
        if !self.available {
            return false;
        }

        for key in keys {
            if let Err(err) = self.store.remove(key) {
                error!(key, error = %err, "failed to clear store");
                return false;
            }
        }
        true
    }
}

fn probe<S: KeyValueStore>(store: &mut S) -> bool {
    match store
        .set(PROBE_KEY, "test")
        .and_then(|()| store.remove(PROBE_KEY))
    {
        Ok(()) => true,
        Err(err) => {
            warn!(error = %err, "durable store is not available");
            false
        }
    }
}
