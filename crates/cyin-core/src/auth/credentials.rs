use std::collections::{hash_map, HashMap};
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use keyring::Entry;

use super::storage::KeyValueStore;

const SERVICE_NAME: &str = "cyin";

/// Storage in the OS keychain, one entry per key.
///
/// Entries are created once per key and reused, so a value written through
/// this store is read back from the same credential.
pub struct KeyringStore {
    service: String,
    entries: Mutex<HashMap<String, Entry>>,
}

impl KeyringStore {
    pub fn new() -> Self {
        Self::with_service(SERVICE_NAME)
    }

    pub fn with_service(service: &str) -> Self {
        Self {
            service: service.to_string(),
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Whether this build talks to the platform credential store.
    /// Without it keyring falls back to an in-process mock that forgets
    /// everything when the process exits.
    pub fn is_persistent() -> bool {
        cfg!(feature = "native-keyring")
    }

    fn with_entry<T>(&self, key: &str, f: impl FnOnce(&Entry) -> T) -> Result<T> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow!("Keyring entry cache lock poisoned"))?;
        let entry = match entries.entry(key.to_string()) {
            hash_map::Entry::Occupied(slot) => slot.into_mut(),
            hash_map::Entry::Vacant(slot) => slot.insert(
                Entry::new(&self.service, key).context("Failed to create keyring entry")?,
            ),
        };
        Ok(f(entry))
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for KeyringStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match self.with_entry(key, Entry::get_password)? {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to retrieve value from keychain"),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.with_entry(key, |entry| entry.set_password(value))?
            .context("Failed to store value in keychain")
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        match self.with_entry(key, Entry::delete_credential)? {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete value from keychain"),
        }
    }
}
