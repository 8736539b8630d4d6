//! Health record data models and their persisted JSON shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    advisory::TriageResult,
    db::helpers::{format_timestamp, now_millis},
};

const SYMPTOM_CHECK_NAME: &str = "Symptom Check";
const SYMPTOM_CHECK_FALLBACK_DESCRIPTION: &str = "Symptom check completed";

/// Rejected metric input. Raised before anything reaches the record store.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("metric type must not be empty")]
    EmptyKind,
    #[error("metric value must not be empty")]
    EmptyValue,
    #[error("metric value '{0}' is not a number")]
    NotANumber(String),
    #[error("metric value '{0}' is not a finite number")]
    NotFinite(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    HeartRate,
    BloodPressure,
    Temperature,
    Weight,
    BloodSugar,
}

impl MetricKind {
    pub const ALL: [MetricKind; 5] = [
        MetricKind::HeartRate,
        MetricKind::BloodPressure,
        MetricKind::Temperature,
        MetricKind::Weight,
        MetricKind::BloodSugar,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::HeartRate => "heartRate",
            MetricKind::BloodPressure => "bloodPressure",
            MetricKind::Temperature => "temperature",
            MetricKind::Weight => "weight",
            MetricKind::BloodSugar => "bloodSugar",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }

    pub fn unit(&self) -> &'static str {
        match self {
            MetricKind::HeartRate => "bpm",
            MetricKind::BloodPressure => "mmHg",
            MetricKind::Temperature => "°C",
            MetricKind::Weight => "kg",
            MetricKind::BloodSugar => "mg/dL",
        }
    }

    /// Inclusive reference range; blood sugar has none.
    pub fn normal_range(&self) -> Option<(f64, f64)> {
        match self {
            MetricKind::HeartRate => Some((60.0, 100.0)),
            MetricKind::BloodPressure => Some((80.0, 120.0)),
            MetricKind::Temperature => Some((36.1, 37.2)),
            MetricKind::Weight => Some((50.0, 100.0)),
            MetricKind::BloodSugar => None,
        }
    }

    /// Zero means "no reading yet" and counts as normal.
    pub fn is_within_normal(&self, value: f64) -> bool {
        match self.normal_range() {
            Some((low, high)) if value != 0.0 => value >= low && value <= high,
            _ => true,
        }
    }
}

/// Unit for a free-form metric type; unknown types carry no unit.
pub fn unit_for(kind: &str) -> &'static str {
    MetricKind::parse(kind).map(|k| k.unit()).unwrap_or("")
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthMetric {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(serialize_with = "crate::db::helpers::json_number::serialize")]
    pub value: f64,
    #[serde(with = "crate::db::helpers::iso8601")]
    pub date: DateTime<Utc>,
    pub unit: String,
}

impl HealthMetric {
    /// Build a metric from raw user input, stamped now.
    pub fn from_input(kind: &str, raw_value: &str) -> Result<Self, ValidationError> {
        let kind = kind.trim();
        if kind.is_empty() {
            return Err(ValidationError::EmptyKind);
        }

        let raw = raw_value.trim();
        if raw.is_empty() {
            return Err(ValidationError::EmptyValue);
        }
        let value: f64 = raw
            .parse()
            .map_err(|_| ValidationError::NotANumber(raw.to_string()))?;
        if !value.is_finite() {
            return Err(ValidationError::NotFinite(raw.to_string()));
        }

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            kind: kind.to_string(),
            value,
            date: now_millis(),
            unit: unit_for(kind).to_string(),
        })
    }

    pub fn is_within_normal(&self) -> bool {
        MetricKind::parse(&self.kind)
            .map(|kind| kind.is_within_normal(self.value))
            .unwrap_or(true)
    }
}

/// Stored outcome of a symptom check. Objects that are not a current
/// [`TriageResult`] are kept verbatim as `Legacy` so old history survives a
/// load/save cycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RecordResult {
    Triage(TriageResult),
    Legacy(serde_json::Value),
}

impl RecordResult {
    pub fn as_triage(&self) -> Option<&TriageResult> {
        match self {
            RecordResult::Triage(result) => Some(result),
            RecordResult::Legacy(_) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SymptomRecord {
    pub id: String,
    pub name: String,
    pub date: String,
    #[serde(rename = "symptoms", default, skip_serializing_if = "Option::is_none")]
    pub symptom_ids: Option<Vec<String>>,
    #[serde(
        rename = "results",
        default,
        deserialize_with = "present_result",
        skip_serializing_if = "Option::is_none"
    )]
    pub result: Option<RecordResult>,
    pub description: String,
}

// A `"results": null` written by older builds is kept as `Legacy(Null)` so the
// key survives the next save. Only an absent key maps to `None`.
fn present_result<'de, D>(deserializer: D) -> Result<Option<RecordResult>, D::Error>
where
    D: Deserializer<'de>,
{
    RecordResult::deserialize(deserializer).map(Some)
}

impl SymptomRecord {
    pub fn from_triage(symptom_ids: Vec<String>, result: TriageResult) -> Self {
        let description = if result.summary.is_empty() {
            SYMPTOM_CHECK_FALLBACK_DESCRIPTION.to_string()
        } else {
            result.summary.clone()
        };

        Self {
            id: Uuid::new_v4().to_string(),
            name: SYMPTOM_CHECK_NAME.to_string(),
            date: format_timestamp(&now_millis()),
            symptom_ids: Some(symptom_ids),
            result: Some(RecordResult::Triage(result)),
            description,
        }
    }
}

/// Point-in-time copy of all health data for export. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportSnapshot {
    pub health_metrics: Vec<HealthMetric>,
    pub recent_symptoms: Vec<SymptomRecord>,
    pub last_checkup: Option<String>,
    #[serde(with = "crate::db::helpers::iso8601")]
    pub export_date: DateTime<Utc>,
    pub version: String,
}

impl ExportSnapshot {
    /// Pretty-printed with two-space indentation.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
