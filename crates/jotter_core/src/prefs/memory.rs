use super::{PreferenceStore, PrefsError, PrefsResult};
use std::collections::HashMap;
use std::sync::Mutex;

/// In-process preference store. Contents are lost on drop.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_values<T>(&self, f: impl FnOnce(&mut HashMap<String, String>) -> T) -> PrefsResult<T> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| PrefsError::Unavailable("memory store lock poisoned".to_string()))?;
        Ok(f(&mut values))
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get_string(&self, key: &str) -> PrefsResult<Option<String>> {
        self.with_values(|values| values.get(key).cloned())
    }

    fn set_string(&self, key: &str, value: &str) -> PrefsResult<()> {
        self.with_values(|values| {
            values.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> PrefsResult<()> {
        self.with_values(|values| {
            values.remove(key);
        })
    }
}
