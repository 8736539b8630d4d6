use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{records::store::read_json, storage::KeyValueStore};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error};

pub const ACCESSIBILITY_SETTINGS_KEY: &str = "accessibility_settings";
pub const LANGUAGE_SETTINGS_KEY: &str = "language_settings";

const DEFAULT_LANGUAGE: &str = "en";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum FontSize {
    Small,
    Medium,
    Large,
}

impl Default for FontSize {
    fn default() -> Self {
        FontSize::Medium
    }
}

impl FontSize {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "small" => Some(FontSize::Small),
            "medium" => Some(FontSize::Medium),
            "large" => Some(FontSize::Large),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceSet {
    pub font_size: FontSize,
    pub high_contrast: bool,
    pub screen_reader: bool,
    pub language: String,
    pub voice_enabled: bool,
}

impl Default for PreferenceSet {
    fn default() -> Self {
        Self {
            font_size: FontSize::Medium,
            high_contrast: false,
            screen_reader: false,
            language: DEFAULT_LANGUAGE.into(),
            voice_enabled: true,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AccessibilitySettings {
    font_size: FontSize,
    high_contrast: bool,
    screen_reader: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LanguageSettings<'a> {
    language: &'a str,
    voice_enabled: bool,
}

// Stored shapes are read field by field as raw JSON so a mistyped or
// missing field falls back to its default without discarding the rest.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StoredAccessibility {
    font_size: Option<Value>,
    high_contrast: Option<Value>,
    screen_reader: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StoredLanguage {
    language: Option<Value>,
    voice_enabled: Option<Value>,
}

fn stored_bool(value: Option<&Value>, default: bool) -> bool {
    value.and_then(Value::as_bool).unwrap_or(default)
}

/// Display, contrast, language and voice preferences. Each setter changes one
/// field and rewrites the whole record; the last write wins.
pub struct PreferenceStore<S: KeyValueStore> {
    storage: S,
    data: RwLock<PreferenceSet>,
}

impl<S: KeyValueStore> PreferenceStore<S> {
    pub async fn load(storage: S) -> Self {
        let data = load_preferences(&storage).await;
        Self {
            storage,
            data: RwLock::new(data),
        }
    }

    pub fn get(&self) -> PreferenceSet {
        self.read().clone()
    }

    pub fn set_font_size(&self, font_size: FontSize) {
        self.update(|prefs| prefs.font_size = font_size);
    }

    pub fn set_high_contrast(&self, enabled: bool) {
        self.update(|prefs| prefs.high_contrast = enabled);
    }

    pub fn set_screen_reader(&self, enabled: bool) {
        self.update(|prefs| prefs.screen_reader = enabled);
    }

    pub fn set_language(&self, language: &str) {
        let language = language.trim().to_string();
        self.update(move |prefs| prefs.language = language);
    }

    pub fn set_voice_enabled(&self, enabled: bool) {
        self.update(|prefs| prefs.voice_enabled = enabled);
    }

    fn update<F: FnOnce(&mut PreferenceSet)>(&self, change: F) {
        let mut guard = self.write();
        change(&mut *guard);
        log_debug!("preferences updated: {:?}", *guard);
        self.persist(&guard);
    }

    fn persist(&self, prefs: &PreferenceSet) {
        let accessibility = AccessibilitySettings {
            font_size: prefs.font_size,
            high_contrast: prefs.high_contrast,
            screen_reader: prefs.screen_reader,
        };
        let language = LanguageSettings {
            language: &prefs.language,
            voice_enabled: prefs.voice_enabled,
        };

        let writes = [
            (ACCESSIBILITY_SETTINGS_KEY, serde_json::to_string(&accessibility)),
            (LANGUAGE_SETTINGS_KEY, serde_json::to_string(&language)),
        ];
        for (key, serialized) in writes {
            let result = serialized
                .map_err(anyhow::Error::from)
                .and_then(|value| self.storage.set(key, value));
            if let Err(err) = result {
                log_error!("Failed to persist {key}: {err:?}");
            }
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, PreferenceSet> {
        match self.data.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, PreferenceSet> {
        match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

async fn load_preferences<S: KeyValueStore>(storage: &S) -> PreferenceSet {
    let defaults = PreferenceSet::default();
    let accessibility: StoredAccessibility = read_json(storage, ACCESSIBILITY_SETTINGS_KEY)
        .await
        .unwrap_or_default();
    let language: StoredLanguage = read_json(storage, LANGUAGE_SETTINGS_KEY)
        .await
        .unwrap_or_default();

    PreferenceSet {
        font_size: accessibility
            .font_size
            .as_ref()
            .and_then(Value::as_str)
            .and_then(FontSize::parse)
            .unwrap_or(defaults.font_size),
        high_contrast: stored_bool(accessibility.high_contrast.as_ref(), defaults.high_contrast),
        screen_reader: stored_bool(accessibility.screen_reader.as_ref(), defaults.screen_reader),
        language: language
            .language
            .as_ref()
            .and_then(Value::as_str)
            .filter(|code| !code.is_empty())
            .map(str::to_string)
            .unwrap_or(defaults.language),
        voice_enabled: stored_bool(language.voice_enabled.as_ref(), defaults.voice_enabled),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[tokio::test]
    async fn defaults_when_nothing_is_stored() {
        let store = PreferenceStore::load(MemoryStore::new()).await;
        assert_eq!(store.get(), PreferenceSet::default());
        assert!(store.get().voice_enabled);
        assert_eq!(store.get().language, "en");
    }

    #[tokio::test]
    async fn each_setter_rewrites_both_records() {
        let backend = MemoryStore::new();
        let store = PreferenceStore::load(backend.clone()).await;

        store.set_font_size(FontSize::Large);
        assert_eq!(
            backend.raw(ACCESSIBILITY_SETTINGS_KEY).as_deref(),
            Some(r#"{"fontSize":"large","highContrast":false,"screenReader":false}"#)
        );
        assert_eq!(
            backend.raw(LANGUAGE_SETTINGS_KEY).as_deref(),
            Some(r#"{"language":"en","voiceEnabled":true}"#)
        );

        store.set_high_contrast(true);
        store.set_screen_reader(true);
        store.set_language("es");
        store.set_voice_enabled(false);

        let reloaded = PreferenceStore::load(backend).await;
        assert_eq!(
            reloaded.get(),
            PreferenceSet {
                font_size: FontSize::Large,
                high_contrast: true,
                screen_reader: true,
                language: "es".into(),
                voice_enabled: false,
            }
        );
    }

    #[tokio::test]
    async fn last_write_wins() {
        let store = PreferenceStore::load(MemoryStore::new()).await;
        store.set_font_size(FontSize::Small);
        store.set_font_size(FontSize::Large);
        assert_eq!(store.get().font_size, FontSize::Large);
    }

    #[tokio::test]
    async fn partial_or_odd_records_fall_back_per_field() {
        let backend = MemoryStore::new();
        backend.insert_raw(ACCESSIBILITY_SETTINGS_KEY, r#"{"fontSize":"huge","highContrast":true}"#);
        backend.insert_raw(LANGUAGE_SETTINGS_KEY, r#"{"language":""}"#);

        let prefs = PreferenceStore::load(backend).await.get();
        assert_eq!(prefs.font_size, FontSize::Medium);
        assert!(prefs.high_contrast);
        assert!(!prefs.screen_reader);
        assert_eq!(prefs.language, "en");
        assert!(prefs.voice_enabled);
    }

    #[tokio::test]
    async fn mistyped_field_keeps_its_valid_neighbours() {
        let backend = MemoryStore::new();
        backend.insert_raw(ACCESSIBILITY_SETTINGS_KEY, r#"{"fontSize":"large","highContrast":"yes","screenReader":true}"#);
        backend.insert_raw(LANGUAGE_SETTINGS_KEY, r#"{"language":42,"voiceEnabled":false}"#);

        let prefs = PreferenceStore::load(backend).await.get();
        assert_eq!(prefs.font_size, FontSize::Large);
        assert!(!prefs.high_contrast);
        assert!(prefs.screen_reader);
        assert_eq!(prefs.language, "en");
        assert!(!prefs.voice_enabled);
    }

    #[tokio::test]
    async fn corrupt_record_loads_defaults() {
        let backend = MemoryStore::new();
        backend.insert_raw(ACCESSIBILITY_SETTINGS_KEY, "not json");
        let store = PreferenceStore::load(backend).await;
        assert_eq!(store.get(), PreferenceSet::default());
    }

    #[tokio::test]
    async fn failed_write_keeps_new_value_in_memory() {
        let backend = MemoryStore::new();
        let store = PreferenceStore::load(backend.clone()).await;
        backend.set_fail_writes(true);

        store.set_high_contrast(true);
        assert!(store.get().high_contrast);
        assert_eq!(backend.raw(ACCESSIBILITY_SETTINGS_KEY), None);
    }
}
