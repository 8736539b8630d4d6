//! Host key-value persistence contract.
//!
//! Stores only ever read a key once at startup and then overwrite or remove
//! whole values, so the contract is three calls. Writes are queued and return
//! as soon as the backend has accepted them; a failure after that point is
//! logged by the backend and never reaches the caller.

mod memory;

use std::future::Future;

use anyhow::Result;

use crate::db::Database;

pub use memory::MemoryStore;

pub trait KeyValueStore: Send + Sync + 'static {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>>> + Send;

    fn set(&self, key: &str, value: String) -> Result<()>;

    fn remove_many(&self, keys: &[&str]) -> Result<()>;
}

/// Backend selected at startup from [`crate::config::StorageKind`].
#[derive(Clone)]
pub enum StorageBackend {
    Sqlite(Database),
    Memory(MemoryStore),
}

impl StorageBackend {
    /// Wait until every write accepted so far has been applied.
    pub async fn flush(&self) -> Result<()> {
        match self {
            StorageBackend::Sqlite(db) => db.flush().await,
            StorageBackend::Memory(_) => Ok(()),
        }
    }
}

impl KeyValueStore for StorageBackend {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>>> + Send {
        let backend = self.clone();
        let key = key.to_string();
        async move {
            match backend {
                StorageBackend::Sqlite(db) => db.kv_get(&key).await,
                StorageBackend::Memory(memory) => memory.get(&key).await,
            }
        }
    }

    fn set(&self, key: &str, value: String) -> Result<()> {
        match self {
            StorageBackend::Sqlite(db) => db.kv_set(key, value),
            StorageBackend::Memory(memory) => memory.set(key, value),
        }
    }

    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        match self {
            StorageBackend::Sqlite(db) => db.kv_remove_many(keys),
            StorageBackend::Memory(memory) => memory.remove_many(keys),
        }
    }
}
