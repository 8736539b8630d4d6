use crate::{
    db::helpers::now_millis,
    records::{HealthMetric, SymptomRecord},
    AppState,
};

pub fn add_health_metric(
    state: &AppState,
    kind: String,
    value: String,
) -> Result<HealthMetric, String> {
    let metric = HealthMetric::from_input(&kind, &value).map_err(|e| e.to_string())?;
    state.records.add_metric(metric.clone());
    Ok(metric)
}

pub fn list_health_metrics(state: &AppState) -> Result<Vec<HealthMetric>, String> {
    Ok(state.records.metrics())
}

pub fn get_latest_metric(state: &AppState, kind: String) -> Result<Option<HealthMetric>, String> {
    Ok(state.records.latest_metric(&kind))
}

pub fn list_symptom_history(
    state: &AppState,
    limit: Option<usize>,
) -> Result<Vec<SymptomRecord>, String> {
    Ok(match limit {
        Some(limit) => state.records.recent_activity(limit),
        None => state.records.symptom_records(),
    })
}

pub fn get_last_checkup(state: &AppState) -> Result<Option<String>, String> {
    Ok(state.records.last_checkup())
}

pub fn record_checkup(state: &AppState) -> Result<String, String> {
    state.records.mark_checkup(now_millis());
    state
        .records
        .last_checkup()
        .ok_or_else(|| "checkup was not recorded".to_string())
}

pub fn export_health_data(state: &AppState) -> Result<String, String> {
    state
        .records
        .export_snapshot()
        .to_json()
        .map_err(|e| e.to_string())
}

pub fn clear_health_data(state: &AppState) -> Result<(), String> {
    state.records.clear_all();
    Ok(())
}
