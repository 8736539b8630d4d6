mod advisory;
mod config;
mod db;
mod preferences;
mod records;
mod shell;
mod storage;
mod utils;

use std::sync::Mutex;

use advisory::{IntentRouter, SymptomSelection, TriageEngine};
use anyhow::Context;
use config::{AppConfig, StorageKind};
use db::Database;
use log::info;
use preferences::{FontSize, PreferenceSet, PreferenceStore};
use records::RecordStore;
use storage::{MemoryStore, StorageBackend};

pub(crate) struct AppState {
    pub(crate) storage: StorageBackend,
    pub(crate) triage: TriageEngine,
    pub(crate) assistant: IntentRouter,
    pub(crate) records: RecordStore<StorageBackend>,
    pub(crate) preferences: PreferenceStore<StorageBackend>,
    pub(crate) selection: Mutex<SymptomSelection>,
}

impl AppState {
    pub(crate) async fn initialize(config: &AppConfig) -> anyhow::Result<Self> {
        let storage = match config.storage {
            StorageKind::Sqlite => {
                std::fs::create_dir_all(&config.data_dir).with_context(|| {
                    format!("creating data directory {}", config.data_dir.display())
                })?;
                StorageBackend::Sqlite(Database::new(config.db_path())?)
            }
            StorageKind::Memory => StorageBackend::Memory(MemoryStore::new()),
        };

        Ok(Self::with_parts(
            storage,
            TriageEngine::new(config.triage_delay),
            IntentRouter::default(),
        )
        .await)
    }

    /// Both stores hydrate from `storage` before this returns.
    pub(crate) async fn with_parts(
        storage: StorageBackend,
        triage: TriageEngine,
        assistant: IntentRouter,
    ) -> Self {
        let records = RecordStore::load(storage.clone()).await;
        let preferences = PreferenceStore::load(storage.clone()).await;
        Self {
            storage,
            triage,
            assistant,
            records,
            preferences,
            selection: Mutex::new(SymptomSelection::new()),
        }
    }
}

fn get_preferences(state: &AppState) -> Result<PreferenceSet, String> {
    Ok(state.preferences.get())
}

fn set_font_size(font_size: String, state: &AppState) -> Result<PreferenceSet, String> {
    let size = FontSize::parse(&font_size)
        .ok_or_else(|| format!("font size must be small, medium or large, got '{font_size}'"))?;
    state.preferences.set_font_size(size);
    Ok(state.preferences.get())
}

fn set_high_contrast(enabled: bool, state: &AppState) -> Result<PreferenceSet, String> {
    state.preferences.set_high_contrast(enabled);
    Ok(state.preferences.get())
}

fn set_screen_reader(enabled: bool, state: &AppState) -> Result<PreferenceSet, String> {
    state.preferences.set_screen_reader(enabled);
    Ok(state.preferences.get())
}

fn set_language(language: String, state: &AppState) -> Result<PreferenceSet, String> {
    if language.trim().is_empty() {
        return Err("language code is required".into());
    }
    state.preferences.set_language(&language);
    Ok(state.preferences.get())
}

fn set_voice_enabled(enabled: bool, state: &AppState) -> Result<PreferenceSet, String> {
    state.preferences.set_voice_enabled(enabled);
    Ok(state.preferences.get())
}

pub fn run() -> anyhow::Result<()> {
    let config = AppConfig::from_env();

    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(config.log_level())
        .init();

    info!("CareCompanion starting up...");

    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    runtime.block_on(async {
        let state = AppState::initialize(&config).await?;
        info!(
            "Storage ready ({:?}), triage delay {} ms",
            config.storage,
            state.triage.delay().as_millis()
        );

        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        shell::run_shell(&state, stdin, std::io::stdout()).await?;

        state.storage.flush().await?;
        info!("CareCompanion shut down");
        Ok::<(), anyhow::Error>(())
    })
}


#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::test_support::memory_state;

    #[tokio::test]
    async fn preference_commands_validate_and_persist() {
        let (state, backend) = memory_state().await;

        assert!(set_font_size("huge".into(), &state).is_err());
        let prefs = set_font_size("large".into(), &state).unwrap();
        assert_eq!(prefs.font_size, FontSize::Large);

        assert!(set_language("  ".into(), &state).is_err());
        set_language("fr".into(), &state).unwrap();
        set_high_contrast(true, &state).unwrap();
        set_screen_reader(true, &state).unwrap();
        set_voice_enabled(false, &state).unwrap();

        let reloaded = PreferenceStore::load(StorageBackend::Memory(backend)).await;
        assert_eq!(reloaded.get(), get_preferences(&state).unwrap());
        assert_eq!(reloaded.get().language, "fr");
        assert!(!reloaded.get().voice_enabled);
    }

    #[tokio::test]
    async fn initialize_with_sqlite_creates_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            data_dir: dir.path().join("nested"),
            storage: StorageKind::Sqlite,
            triage_delay: Duration::ZERO,
            debug: false,
        };

        let state = AppState::initialize(&config).await.unwrap();
        match &state.storage {
            StorageBackend::Sqlite(db) => assert_eq!(db.path(), config.db_path()),
            StorageBackend::Memory(_) => panic!("expected sqlite backend"),
        }
        state.preferences.set_high_contrast(true);
        state.storage.flush().await.unwrap();
        assert!(config.db_path().exists());
        drop(state);

        let state = AppState::initialize(&config).await.unwrap();
        assert!(state.preferences.get().high_contrast);
    }

    #[tokio::test]
    async fn initialize_in_memory_starts_empty() {
        let config = AppConfig {
            storage: StorageKind::Memory,
            triage_delay: Duration::ZERO,
            ..AppConfig::default()
        };
        let state = AppState::initialize(&config).await.unwrap();
        assert_eq!(state.triage.delay(), Duration::ZERO);
        assert!(state.records.metrics().is_empty());
        assert_eq!(state.preferences.get(), PreferenceSet::default());
    }
}
