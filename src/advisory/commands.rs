use std::sync::MutexGuard;

use serde::Serialize;

use crate::{
    advisory::{
        intent::classify,
        knowledge_base::{self, SymptomEntry},
        voice::{self, HomeCommand, SymptomCommand, SymptomSelection},
        Intent,
    },
    records::SymptomRecord,
    AppState,
};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub intent: Intent,
    pub reply: String,
}

fn selection_from_state(state: &AppState) -> MutexGuard<'_, SymptomSelection> {
    match state.selection.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

pub fn list_symptoms() -> Vec<SymptomEntry> {
    knowledge_base::entries().to_vec()
}

pub async fn send_chat_message(state: &AppState, message: String) -> Result<ChatReply, String> {
    let reply = state.assistant.process_message(&message).await;
    Ok(ChatReply {
        intent: classify(&message),
        reply,
    })
}

/// Run triage on the given ids and file the outcome in symptom history.
pub async fn analyze_symptoms(
    state: &AppState,
    symptom_ids: Vec<String>,
) -> Result<SymptomRecord, String> {
    let result = state.triage.analyze(&symptom_ids).await;
    let record = SymptomRecord::from_triage(symptom_ids, result);
    state.records.add_symptom_record(record.clone());
    Ok(record)
}

/// Analyze whatever is currently selected, clearing the selection.
pub async fn analyze_selection(state: &AppState) -> Result<SymptomRecord, String> {
    let symptom_ids = selection_from_state(state).take();
    if symptom_ids.is_empty() {
        return Err("no symptoms selected".into());
    }
    analyze_symptoms(state, symptom_ids).await
}

pub fn toggle_symptom(state: &AppState, symptom_id: String) -> Result<Vec<String>, String> {
    if knowledge_base::lookup(&symptom_id).is_none() {
        return Err(format!("unknown symptom '{symptom_id}'"));
    }
    let mut selection = selection_from_state(state);
    selection.toggle(&symptom_id);
    Ok(selection.ids().to_vec())
}

pub fn selected_symptoms(state: &AppState) -> Vec<String> {
    selection_from_state(state).ids().to_vec()
}

pub fn handle_home_voice_command(utterance: String) -> Result<HomeCommand, String> {
    Ok(voice::route_home_command(&utterance))
}

/// Mentioned symptoms are added to the current selection.
pub fn handle_symptom_voice_command(
    state: &AppState,
    utterance: String,
) -> Result<SymptomCommand, String> {
    let command = voice::route_symptom_command(&utterance);
    if let SymptomCommand::AddSymptoms(ids) = &command {
        selection_from_state(state).extend(ids);
    }
    Ok(command)
}
