use std::{
    collections::HashMap,
    future::Future,
    sync::{Arc, Mutex, MutexGuard},
};

use anyhow::{bail, Result};

use super::KeyValueStore;

#[derive(Default)]
struct MemoryState {
    entries: HashMap<String, String>,
    fail_writes: bool,
}

/// Process-local key-value store. Used for ephemeral sessions and as the
/// backend in store tests, where `fail_writes` simulates a broken disk.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    /// Synchronous peek used by tests and diagnostics.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.lock().entries.get(key).cloned()
    }

    pub fn insert_raw(&self, key: &str, value: &str) {
        self.lock().entries.insert(key.to_string(), value.to_string());
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>>> + Send {
        let value = self.raw(key);
        async move { Ok(value) }
    }

    fn set(&self, key: &str, value: String) -> Result<()> {
        let mut state = self.lock();
        if state.fail_writes {
            bail!("simulated write failure for key {key}");
        }
        state.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        let mut state = self.lock();
        if state.fail_writes {
            bail!("simulated remove failure for {} keys", keys.len());
        }
        for key in keys {
            state.entries.remove(*key);
        }
        Ok(())
    }
}
