//! Routing for finalized voice utterances. Capture and transcription happen
//! outside the crate; each listening session hands over one string.

use serde::{Deserialize, Serialize};

use super::knowledge_base;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum HomeCommand {
    CheckSymptoms,
    ShowEmergencyContacts,
    ShowHealthRecords,
    NotUnderstood,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "kind", content = "symptoms")]
pub enum SymptomCommand {
    AddSymptoms(Vec<String>),
    StartCheck,
    NotUnderstood,
}

pub fn route_home_command(utterance: &str) -> HomeCommand {
    let lower = utterance.to_lowercase();
    let mentions = |words: &[&str]| words.iter().any(|word| lower.contains(word));

    if mentions(&["symptom", "pain", "hurt"]) {
        HomeCommand::CheckSymptoms
    } else if mentions(&["emergency", "help"]) {
        HomeCommand::ShowEmergencyContacts
    } else if mentions(&["health", "record"]) {
        HomeCommand::ShowHealthRecords
    } else {
        HomeCommand::NotUnderstood
    }
}

/// Symptom mentions take priority over "check"/"analyze", so
/// "check my headache" adds headache instead of starting the check.
pub fn route_symptom_command(utterance: &str) -> SymptomCommand {
    let mentioned = mentioned_symptoms(utterance);
    if !mentioned.is_empty() {
        return SymptomCommand::AddSymptoms(mentioned.into_iter().map(str::to_string).collect());
    }

    let lower = utterance.to_lowercase();
    if lower.contains("check") || lower.contains("analyze") {
        SymptomCommand::StartCheck
    } else {
        SymptomCommand::NotUnderstood
    }
}

/// Knowledge-base ids whose id or display name appears in the utterance, in
/// table order.
pub fn mentioned_symptoms(utterance: &str) -> Vec<&'static str> {
    let lower = utterance.to_lowercase();
    knowledge_base::entries()
        .iter()
        .filter(|entry| lower.contains(entry.id) || lower.contains(&entry.name.to_lowercase()))
        .map(|entry| entry.id)
        .collect()
}

/// Symptoms picked for the next analysis, in pick order without repeats.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymptomSelection {
    ids: Vec<String>,
}

impl SymptomSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the id is selected afterwards.
    pub fn toggle(&mut self, id: &str) -> bool {
        if let Some(pos) = self.ids.iter().position(|existing| existing == id) {
            self.ids.remove(pos);
            false
        } else {
            self.ids.push(id.to_string());
            true
        }
    }

    pub fn extend<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for id in ids {
            let id = id.as_ref();
            if !self.contains(id) {
                self.ids.push(id.to_string());
            }
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|existing| existing == id)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Hand the selection to a caller and start over.
    pub fn take(&mut self) -> Vec<String> {
        std::mem::take(&mut self.ids)
    }
}
