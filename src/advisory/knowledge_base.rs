//! Static symptom rule table.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Mild
    }
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Mild => "mild",
            Severity::Moderate => "moderate",
            Severity::Severe => "severe",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymptomEntry {
    pub id: &'static str,
    pub name: &'static str,
    pub severity: Severity,
    pub causes: &'static [&'static str],
    pub recommendations: &'static [&'static str],
}

static ENTRIES: [SymptomEntry; 8] = [
    SymptomEntry {
        id: "headache",
        name: "Headache",
        severity: Severity::Mild,
        causes: &["tension", "dehydration", "stress", "eye strain"],
        recommendations: &[
            "Rest in a quiet, dark room",
            "Stay hydrated",
            "Apply cold compress",
        ],
    },
    SymptomEntry {
        id: "fever",
        name: "Fever",
        severity: Severity::Moderate,
        causes: &["infection", "inflammation", "immune response"],
        recommendations: &[
            "Monitor temperature regularly",
            "Stay hydrated",
            "Rest",
            "Consider fever reducer",
        ],
    },
    SymptomEntry {
        id: "cough",
        name: "Cough",
        severity: Severity::Mild,
        causes: &["cold", "allergies", "irritation"],
        recommendations: &[
            "Stay hydrated",
            "Use honey for throat relief",
            "Avoid irritants",
        ],
    },
    SymptomEntry {
        id: "fatigue",
        name: "Fatigue",
        severity: Severity::Mild,
        causes: &["lack of sleep", "stress", "poor nutrition"],
        recommendations: &[
            "Ensure adequate sleep",
            "Eat balanced meals",
            "Light exercise",
        ],
    },
    SymptomEntry {
        id: "nausea",
        name: "Nausea",
        severity: Severity::Moderate,
        causes: &["food poisoning", "motion sickness", "medication"],
        recommendations: &["Stay hydrated with small sips", "Eat bland foods", "Rest"],
    },
    SymptomEntry {
        id: "dizziness",
        name: "Dizziness",
        severity: Severity::Moderate,
        causes: &["dehydration", "low blood sugar", "inner ear issues"],
        recommendations: &[
            "Sit or lie down immediately",
            "Stay hydrated",
            "Avoid sudden movements",
        ],
    },
    SymptomEntry {
        id: "chest_pain",
        name: "Chest Pain",
        severity: Severity::Severe,
        causes: &["heart issues", "lung problems", "muscle strain"],
        recommendations: &[
            "Seek immediate medical attention",
            "Do not ignore chest pain",
            "Call emergency services",
        ],
    },
    SymptomEntry {
        id: "breathing",
        name: "Breathing Difficulty",
        severity: Severity::Severe,
        causes: &["asthma", "pneumonia", "heart problems"],
        recommendations: &[
            "Seek immediate medical attention",
            "Use prescribed inhaler if available",
            "Call emergency services",
        ],
    },
];

/// Entries in display order.
pub fn entries() -> &'static [SymptomEntry] {
    &ENTRIES
}

pub fn lookup(id: &str) -> Option<&'static SymptomEntry> {
    ENTRIES.iter().find(|entry| entry.id == id)
}
