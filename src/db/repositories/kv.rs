use std::future::Future;

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use crate::{
    db::{connection::Database, helpers::format_timestamp},
    storage::KeyValueStore,
};

impl Database {
    /// Read a single value; `None` when the key has never been written or was removed.
    pub async fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let key = key.to_string();
        self.execute(move |conn| {
            let value = conn
                .query_row(
                    "SELECT value FROM kv_entries WHERE key = ?1",
                    params![key],
                    |row| row.get::<_, String>(0),
                )
                .optional()
                .with_context(|| format!("failed to read key {key}"))?;
            Ok(value)
        })
        .await
    }

    pub fn kv_set(&self, key: &str, value: String) -> Result<()> {
        let key = key.to_string();
        self.execute_detached("kv write", move |conn| {
            conn.execute(
                "INSERT INTO kv_entries (key, value, updated_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value, format_timestamp(&Utc::now())],
            )
            .with_context(|| format!("failed to write key {key}"))?;
            Ok(())
        })
    }

    /// Delete the rows outright so a later read reports the keys as absent.
    pub fn kv_remove_many(&self, keys: &[&str]) -> Result<()> {
        let keys: Vec<String> = keys.iter().map(|key| key.to_string()).collect();
        self.execute_detached("kv remove", move |conn| {
            let tx = conn.transaction()?;
            for key in &keys {
                tx.execute("DELETE FROM kv_entries WHERE key = ?1", params![key])
                    .with_context(|| format!("failed to remove key {key}"))?;
            }
            tx.commit().context("failed to commit key removal")?;
            Ok(())
        })
    }
}

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>>> + Send {
        let db = self.clone();
        let key = key.to_string();
        async move { db.kv_get(&key).await }
    }

    fn set(&self, key: &str, value: String) -> Result<()> {
        self.kv_set(key, value)
    }

    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        self.kv_remove_many(keys)
    }
}
