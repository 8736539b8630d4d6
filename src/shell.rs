//! Line-oriented console over the command surface. One command per line;
//! structured results are printed as pretty JSON.

use std::io::Write;

use anyhow::Result;
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::{
    advisory::{commands as advisory, SymptomCommand},
    get_preferences,
    records::{commands as records, MetricKind, RecordResult, SymptomRecord},
    set_font_size, set_high_contrast, set_language, set_screen_reader, set_voice_enabled,
    AppState,
};

const ENABLE_LOGS: bool = true;

use crate::log_debug;

const PROMPT: &str = "> ";
const BANNER: &str = "CareCompanion. Type 'help' for commands.";
const DEFAULT_HISTORY_LIMIT: usize = 5;

const HELP: &str = "\
Commands:
  symptoms                      list known symptoms
  select <id>                   add or remove a symptom from the selection
  analyze [id ...]              analyze the given ids, or the current selection
  chat <message>                talk to the assistant
  voice home <utterance>        route a spoken home-screen command
  voice symptoms <utterance>    route a spoken symptom-checker command
  metric <type> <value>         record a reading (bloodPressure, heartRate, weight, temperature, bloodSugar)
  latest <type>                 most recent reading of a type
  metrics                       all readings
  history [n|all]               newest symptom checks (5 when n is omitted)
  checkup                       record a checkup now
  export                        print all health data as JSON
  clear                         delete all health data
  prefs                         show preferences
  set font <small|medium|large>
  set contrast <on|off>
  set reader <on|off>
  set language <code>
  set voice <on|off>
  quit                          leave";

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Reply {
    Text(String),
    Quit,
}

pub(crate) async fn run_shell<R, W>(state: &AppState, input: R, mut output: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(output, "{BANNER}")?;
    let mut lines = input.lines();
    loop {
        write!(output, "{PROMPT}")?;
        output.flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match dispatch(state, &line).await {
            Reply::Text(text) if text.is_empty() => {}
            Reply::Text(text) => writeln!(output, "{text}")?,
            Reply::Quit => break,
        }
    }
    output.flush()?;
    Ok(())
}

pub(crate) async fn dispatch(state: &AppState, line: &str) -> Reply {
    let line = line.trim();
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };
    log_debug!("shell command '{command}'");

    let result = match command {
        "" => Ok(String::new()),
        "help" => Ok(HELP.to_string()),
        "quit" | "exit" => return Reply::Quit,
        "symptoms" => Ok(render_symptoms()),
        "select" => select(state, rest),
        "analyze" => analyze(state, rest).await,
        "chat" => chat(state, rest).await,
        "voice" => voice(state, rest),
        "metric" => metric(state, rest),
        "latest" => latest(state, rest),
        "metrics" => records::list_health_metrics(state).and_then(|metrics| to_json(&metrics)),
        "history" => history(state, rest),
        "checkup" => records::record_checkup(state).map(|at| format!("Checkup recorded at {at}")),
        "export" => records::export_health_data(state),
        "clear" => records::clear_health_data(state).map(|_| "All health data cleared".into()),
        "prefs" => get_preferences(state).and_then(|prefs| to_json(&prefs)),
        "set" => set(state, rest),
        other => Err(format!("unknown command '{other}', type 'help'")),
    };

    match result {
        Ok(text) => Reply::Text(text),
        Err(err) => Reply::Text(format!("error: {err}")),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| e.to_string())
}

fn render_symptoms() -> String {
    advisory::list_symptoms()
        .iter()
        .map(|entry| format!("{:<12} {} ({})", entry.id, entry.name, entry.severity.as_str()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_record(record: &SymptomRecord) -> String {
    let Some(triage) = record.result.as_ref().and_then(RecordResult::as_triage) else {
        return record.description.clone();
    };

    let mut lines = vec![
        format!("Severity: {}", triage.severity.as_str()),
        triage.summary.clone(),
    ];
    if !triage.causes.is_empty() {
        lines.push("Possible causes:".into());
        lines.extend(triage.causes.iter().map(|cause| format!("  - {cause}")));
    }
    if !triage.recommendations.is_empty() {
        lines.push("Recommendations:".into());
        lines.extend(triage.recommendations.iter().map(|rec| format!("  - {rec}")));
    }
    lines.push(triage.disclaimer.clone());
    lines.join("\n")
}

fn select(state: &AppState, rest: &str) -> Result<String, String> {
    if rest.is_empty() {
        let selected = advisory::selected_symptoms(state);
        return Ok(format!("Selected: [{}]", selected.join(", ")));
    }
    let selected = advisory::toggle_symptom(state, rest.to_string())?;
    Ok(format!("Selected: [{}]", selected.join(", ")))
}

async fn analyze(state: &AppState, rest: &str) -> Result<String, String> {
    let record = if rest.is_empty() {
        advisory::analyze_selection(state).await?
    } else {
        let ids = rest.split_whitespace().map(str::to_string).collect();
        advisory::analyze_symptoms(state, ids).await?
    };
    Ok(render_record(&record))
}

async fn chat(state: &AppState, rest: &str) -> Result<String, String> {
    if rest.is_empty() {
        return Err("usage: chat <message>".into());
    }
    let reply = advisory::send_chat_message(state, rest.to_string()).await?;
    Ok(reply.reply)
}

fn voice(state: &AppState, rest: &str) -> Result<String, String> {
    let (screen, utterance) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    match screen {
        "home" => advisory::handle_home_voice_command(utterance.trim().to_string())
            .and_then(|command| to_json(&command)),
        "symptoms" => {
            let command = advisory::handle_symptom_voice_command(state, utterance.trim().to_string())?;
            match command {
                SymptomCommand::AddSymptoms(_) => select(state, ""),
                other => to_json(&other),
            }
        }
        _ => Err("usage: voice <home|symptoms> <utterance>".into()),
    }
}

fn metric(state: &AppState, rest: &str) -> Result<String, String> {
    let (kind, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    let metric = records::add_health_metric(state, kind.to_string(), value.trim().to_string())?;

    let mut text = format!("Recorded {} {} {}", metric.kind, metric.value, metric.unit);
    if MetricKind::parse(&metric.kind).is_some() && !metric.is_within_normal() {
        text.push_str(" (outside the typical range)");
    }
    Ok(text)
}

fn latest(state: &AppState, rest: &str) -> Result<String, String> {
    if rest.is_empty() {
        return Err("usage: latest <type>".into());
    }
    match records::get_latest_metric(state, rest.to_string())? {
        Some(metric) => Ok(format!(
            "{} {} {} at {}",
            metric.kind,
            metric.value,
            metric.unit,
            crate::db::helpers::format_timestamp(&metric.date)
        )),
        None => Ok(format!("No {rest} readings yet")),
    }
}

fn history(state: &AppState, rest: &str) -> Result<String, String> {
    let limit = match rest {
        "" => Some(DEFAULT_HISTORY_LIMIT),
        "all" => None,
        n => Some(
            n.parse::<usize>()
                .map_err(|_| format!("history limit must be a number, got '{n}'"))?,
        ),
    };
    let records = records::list_symptom_history(state, limit)?;
    if records.is_empty() {
        return Ok("No symptom checks yet".into());
    }
    Ok(records
        .iter()
        .map(|record| format!("{}  {}  {}", record.date, record.name, record.description))
        .collect::<Vec<_>>()
        .join("\n"))
}

fn parse_switch(value: &str) -> Result<bool, String> {
    match value {
        "on" | "true" | "yes" => Ok(true),
        "off" | "false" | "no" => Ok(false),
        other => Err(format!("expected on or off, got '{other}'")),
    }
}

fn set(state: &AppState, rest: &str) -> Result<String, String> {
    let (field, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    let value = value.trim();
    let prefs = match field {
        "font" => set_font_size(value.to_string(), state)?,
        "contrast" => set_high_contrast(parse_switch(value)?, state)?,
        "reader" => set_screen_reader(parse_switch(value)?, state)?,
        "language" => set_language(value.to_string(), state)?,
        "voice" => set_voice_enabled(parse_switch(value)?, state)?,
        _ => return Err("usage: set <font|contrast|reader|language|voice> <value>".into()),
    };
    to_json(&prefs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        advisory::triage::DISCLAIMER, records::store::HEALTH_METRICS_KEY,
        test_support::memory_state,
    };

    fn text(reply: Reply) -> String {
        match reply {
            Reply::Text(text) => text,
            Reply::Quit => panic!("unexpected quit"),
        }
    }

    #[tokio::test]
    async fn analyze_prints_verdict_and_files_history() {
        let (state, _) = memory_state().await;

        let out = text(dispatch(&state, "analyze headache chest_pain").await);
        assert!(out.starts_with("Severity: severe"));
        assert!(out.ends_with(DISCLAIMER));

        let history = text(dispatch(&state, "history").await);
        assert!(history.contains("Symptom Check"));
        assert_eq!(state.records.symptom_records().len(), 1);
    }

    #[tokio::test]
    async fn analyze_without_selection_is_an_error() {
        let (state, _) = memory_state().await;
        assert_eq!(
            dispatch(&state, "analyze").await,
            Reply::Text("error: no symptoms selected".into())
        );
    }

    #[tokio::test]
    async fn selection_then_analyze_consumes_selection() {
        let (state, _) = memory_state().await;
        text(dispatch(&state, "select fatigue").await);
        text(dispatch(&state, "voice symptoms I have a headache").await);
        assert_eq!(advisory::selected_symptoms(&state), vec!["fatigue", "headache"]);

        let out = text(dispatch(&state, "analyze").await);
        assert!(out.starts_with("Severity: mild"));
        assert!(advisory::selected_symptoms(&state).is_empty());
    }

    #[tokio::test]
    async fn select_rejects_unknown_symptom() {
        let (state, _) = memory_state().await;
        let out = text(dispatch(&state, "select hiccups").await);
        assert_eq!(out, "error: unknown symptom 'hiccups'");
    }

    #[tokio::test]
    async fn chat_uses_assistant() {
        let (state, _) = memory_state().await;
        let out = text(dispatch(&state, "chat this is an emergency").await);
        assert_eq!(out, crate::advisory::intent::EMERGENCY_RESPONSE);
    }

    #[tokio::test]
    async fn metric_validation_and_persistence() {
        let (state, backend) = memory_state().await;

        let out = text(dispatch(&state, "metric heartRate abc").await);
        assert!(out.starts_with("error:"));
        assert_eq!(backend.raw(HEALTH_METRICS_KEY), None);

        let out = text(dispatch(&state, "metric heartRate 72").await);
        assert_eq!(out, "Recorded heartRate 72 bpm");
        let out = text(dispatch(&state, "metric temperature 101.5").await);
        assert!(out.ends_with("(outside the typical range)"));

        let latest = text(dispatch(&state, "latest heartRate").await);
        assert!(latest.starts_with("heartRate 72 bpm at "));
        assert!(backend.raw(HEALTH_METRICS_KEY).is_some());
    }

    #[tokio::test]
    async fn export_and_clear() {
        let (state, _) = memory_state().await;
        text(dispatch(&state, "checkup").await);
        text(dispatch(&state, "metric weight 150").await);

        let export = text(dispatch(&state, "export").await);
        let json: serde_json::Value = serde_json::from_str(&export).unwrap();
        assert_eq!(json["version"], "1.0.0");
        assert_eq!(json["healthMetrics"].as_array().unwrap().len(), 1);
        assert!(json["lastCheckup"].is_string());

        text(dispatch(&state, "clear").await);
        assert!(state.records.metrics().is_empty());
        assert_eq!(state.records.last_checkup(), None);
    }

    #[tokio::test]
    async fn set_preferences() {
        let (state, _) = memory_state().await;
        text(dispatch(&state, "set font large").await);
        text(dispatch(&state, "set voice off").await);
        let out = text(dispatch(&state, "set contrast maybe").await);
        assert_eq!(out, "error: expected on or off, got 'maybe'");

        let prefs = state.preferences.get();
        assert_eq!(prefs.font_size, crate::preferences::FontSize::Large);
        assert!(!prefs.voice_enabled);
        assert!(!prefs.high_contrast);
    }

    #[tokio::test]
    async fn run_shell_stops_at_quit() {
        let (state, _) = memory_state().await;
        let input: &[u8] = b"voice home show my health records\nquit\nchat never reached\n";
        let mut output = Vec::new();

        run_shell(&state, input, &mut output).await.unwrap();

        let printed = String::from_utf8(output).unwrap();
        assert!(printed.starts_with(BANNER));
        assert!(printed.contains("\"showHealthRecords\""));
        assert!(!printed.contains("general health information"));
    }

    #[tokio::test]
    async fn history_defaults_to_newest_five() {
        let (state, _) = memory_state().await;
        for _ in 0..DEFAULT_HISTORY_LIMIT + 1 {
            text(dispatch(&state, "analyze cough").await);
        }

        let newest = text(dispatch(&state, "history").await);
        assert_eq!(newest.lines().count(), DEFAULT_HISTORY_LIMIT);
        let everything = text(dispatch(&state, "history all").await);
        assert_eq!(everything.lines().count(), DEFAULT_HISTORY_LIMIT + 1);
        assert_eq!(text(dispatch(&state, "history 2").await).lines().count(), 2);

        let help = text(dispatch(&state, "help").await);
        assert!(help.contains("history [n|all]"));
        assert!(help.contains(&format!("({DEFAULT_HISTORY_LIMIT} when n is omitted)")));
    }

    #[tokio::test]
    async fn unknown_command_points_to_help() {
        let (state, _) = memory_state().await;
        let out = text(dispatch(&state, "dance").await);
        assert_eq!(out, "error: unknown command 'dance', type 'help'");
        assert_eq!(dispatch(&state, "   ").await, Reply::Text(String::new()));
    }
}
