use std::{path::PathBuf, time::Duration};

use log::{warn, LevelFilter};

use crate::advisory::DEFAULT_TRIAGE_DELAY;

const DATA_DIR_ENV: &str = "CARECOMPANION_DATA_DIR";
const STORAGE_ENV: &str = "CARECOMPANION_STORAGE";
const TRIAGE_DELAY_ENV: &str = "CARECOMPANION_TRIAGE_DELAY_MS";
const DEBUG_ENV: &str = "CARECOMPANION_DEBUG";

const APP_DIR_NAME: &str = "carecompanion";
const DB_FILE_NAME: &str = "carecompanion.sqlite3";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Sqlite,
    Memory,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub storage: StorageKind,
    pub triage_delay: Duration,
    pub debug: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            storage: StorageKind::Sqlite,
            triage_delay: DEFAULT_TRIAGE_DELAY,
            debug: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Unusable values are ignored
    /// with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup(DATA_DIR_ENV).filter(|dir| !dir.trim().is_empty()) {
            config.data_dir = PathBuf::from(dir);
        }

        if let Some(storage) = lookup(STORAGE_ENV) {
            match storage.trim().to_ascii_lowercase().as_str() {
                "sqlite" => config.storage = StorageKind::Sqlite,
                "memory" => config.storage = StorageKind::Memory,
                other => warn!("Ignoring unknown {STORAGE_ENV} value '{other}'"),
            }
        }

        if let Some(delay) = lookup(TRIAGE_DELAY_ENV) {
            match delay.trim().parse::<u64>() {
                Ok(ms) => config.triage_delay = Duration::from_millis(ms),
                Err(err) => warn!("Ignoring invalid {TRIAGE_DELAY_ENV} '{delay}': {err}"),
            }
        }

        config.debug = lookup(DEBUG_ENV)
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        config
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }

    pub fn log_level(&self) -> LevelFilter {
        if self.debug {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}
