use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

use super::models::{ExportSnapshot, HealthMetric, SymptomRecord};
use crate::{
    db::helpers::{format_timestamp, now_millis},
    storage::KeyValueStore,
};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info, log_warn};

pub const HEALTH_METRICS_KEY: &str = "health_metrics";
pub const RECENT_SYMPTOMS_KEY: &str = "recent_symptoms";
pub const LAST_CHECKUP_KEY: &str = "last_checkup";

pub const MAX_SYMPTOM_RECORDS: usize = 50;
pub const EXPORT_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Default)]
struct HealthData {
    metrics: Vec<HealthMetric>,
    symptom_records: Vec<SymptomRecord>,
    last_checkup: Option<String>,
}

/// Health metrics and symptom-check history.
///
/// Every mutation updates memory first and then hands the new state to the
/// backend without waiting. Memory is the source of truth for the session: a
/// failed write is logged and left alone, and a crash before the write lands
/// loses that one update.
pub struct RecordStore<S: KeyValueStore> {
    storage: S,
    data: RwLock<HealthData>,
}

impl<S: KeyValueStore> RecordStore<S> {
    /// Construct and run the one-time load. Never fails: missing or corrupt
    /// keys load as empty.
    pub async fn load(storage: S) -> Self {
        let data = load_all(&storage).await;
        Self {
            storage,
            data: RwLock::new(data),
        }
    }

    /// Replace in-memory state with whatever the backend currently holds.
    pub async fn reload(&self) {
        let data = load_all(&self.storage).await;
        *self.write() = data;
    }

    pub fn add_metric(&self, metric: HealthMetric) {
        let mut guard = self.write();
        log_debug!("adding {} metric {}", metric.kind, metric.id);
        guard.metrics.push(metric);
        self.persist_collections(&guard);
    }

    /// Newest first; anything past the retention cap falls off the end.
    pub fn add_symptom_record(&self, record: SymptomRecord) {
        let mut guard = self.write();
        guard.symptom_records.insert(0, record);
        guard.symptom_records.truncate(MAX_SYMPTOM_RECORDS);
        self.persist_collections(&guard);
    }

    pub fn mark_checkup(&self, at: DateTime<Utc>) {
        let mut guard = self.write();
        let value = format_timestamp(&at);
        guard.last_checkup = Some(value.clone());
        if let Err(err) = self.storage.set(LAST_CHECKUP_KEY, value) {
            log_error!("Failed to persist {LAST_CHECKUP_KEY}: {err:?}");
        }
    }

    /// Drop everything, removing the keys rather than writing empty values.
    pub fn clear_all(&self) {
        let mut guard = self.write();
        *guard = HealthData::default();
        if let Err(err) =
            self.storage
                .remove_many(&[HEALTH_METRICS_KEY, RECENT_SYMPTOMS_KEY, LAST_CHECKUP_KEY])
        {
            log_error!("Failed to remove health data keys: {err:?}");
        }
        log_info!("Cleared all health data");
    }

    pub fn metrics(&self) -> Vec<HealthMetric> {
        self.read().metrics.clone()
    }

    pub fn symptom_records(&self) -> Vec<SymptomRecord> {
        self.read().symptom_records.clone()
    }

    pub fn recent_activity(&self, limit: usize) -> Vec<SymptomRecord> {
        self.read()
            .symptom_records
            .iter()
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn last_checkup(&self) -> Option<String> {
        self.read().last_checkup.clone()
    }

    /// Last-inserted metric of this type.
    pub fn latest_metric(&self, kind: &str) -> Option<HealthMetric> {
        self.read()
            .metrics
            .iter()
            .rev()
            .find(|metric| metric.kind == kind)
            .cloned()
    }

    pub fn export_snapshot(&self) -> ExportSnapshot {
        let guard = self.read();
        ExportSnapshot {
            health_metrics: guard.metrics.clone(),
            recent_symptoms: guard.symptom_records.clone(),
            last_checkup: guard.last_checkup.clone(),
            export_date: now_millis(),
            version: EXPORT_VERSION.to_string(),
        }
    }

    // Called with the write guard held so writes reach the backend in
    // mutation order.
    fn persist_collections(&self, data: &HealthData) {
        self.persist_json(HEALTH_METRICS_KEY, &data.metrics);
        self.persist_json(RECENT_SYMPTOMS_KEY, &data.symptom_records);
    }

    fn persist_json<T: Serialize>(&self, key: &str, value: &T) {
        let serialized = match serde_json::to_string(value) {
            Ok(serialized) => serialized,
            Err(err) => {
                log_error!("Failed to serialize {key}: {err}");
                return;
            }
        };
        if let Err(err) = self.storage.set(key, serialized) {
            log_error!("Failed to persist {key}: {err:?}");
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HealthData> {
        match self.data.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, HealthData> {
        match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

async fn load_all<S: KeyValueStore>(storage: &S) -> HealthData {
    let metrics: Vec<HealthMetric> = read_json(storage, HEALTH_METRICS_KEY)
        .await
        .unwrap_or_default();
    let symptom_records: Vec<SymptomRecord> = read_json(storage, RECENT_SYMPTOMS_KEY)
        .await
        .unwrap_or_default();
    let last_checkup = read_raw(storage, LAST_CHECKUP_KEY).await;

    log_info!(
        "Loaded {} metric(s) and {} symptom record(s)",
        metrics.len(),
        symptom_records.len()
    );

    HealthData {
        metrics,
        symptom_records,
        last_checkup,
    }
}

async fn read_raw<S: KeyValueStore>(storage: &S, key: &str) -> Option<String> {
    match storage.get(key).await {
        Ok(value) => value,
        Err(err) => {
            log_warn!("Failed to read {key}, using defaults: {err:?}");
            None
        }
    }
}

/// Absent, unreadable and unparseable all come back as `None`.
pub(crate) async fn read_json<S, T>(storage: &S, key: &str) -> Option<T>
where
    S: KeyValueStore,
    T: DeserializeOwned,
{
    let raw = read_raw(storage, key).await?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            log_warn!("Discarding unparseable {key}: {err}");
            None
        }
    }
}
