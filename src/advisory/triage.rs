use std::{collections::HashSet, time::Duration};

use serde::{Deserialize, Serialize};

use super::knowledge_base::{self, Severity};

// Set to true to trace skipped symptom ids
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

pub const MAX_RECOMMENDATIONS: usize = 5;
pub const MAX_CAUSES: usize = 3;
pub const DEFAULT_TRIAGE_DELAY: Duration = Duration::from_millis(2000);

pub const DISCLAIMER: &str = "This analysis is for informational purposes only and should not replace professional medical advice.";

const MILD_SUMMARY: &str = "Your symptoms appear to be mild. Following the recommendations below should help you feel better.";
const MODERATE_SUMMARY: &str = "Your symptoms are moderate and should be monitored. Consider consulting a healthcare provider if they persist.";
const SEVERE_SUMMARY: &str = "Your symptoms may be serious. Please seek immediate medical attention.";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TriageResult {
    pub severity: Severity,
    pub summary: String,
    pub recommendations: Vec<String>,
    #[serde(rename = "possibleCauses")]
    pub causes: Vec<String>,
    pub disclaimer: String,
}

pub fn summary_for(severity: Severity) -> &'static str {
    match severity {
        Severity::Mild => MILD_SUMMARY,
        Severity::Moderate => MODERATE_SUMMARY,
        Severity::Severe => SEVERE_SUMMARY,
    }
}

/// Fold symptom ids into a single verdict. Ids missing from the knowledge
/// base are skipped and contribute nothing.
pub fn aggregate<S: AsRef<str>>(symptom_ids: &[S]) -> TriageResult {
    let mut severity = Severity::Mild;
    let mut causes: Vec<&'static str> = Vec::new();
    let mut recommendations: Vec<&'static str> = Vec::new();

    for id in symptom_ids {
        let id = id.as_ref();
        let Some(entry) = knowledge_base::lookup(id) else {
            log_debug!("skipping unknown symptom id '{id}'");
            continue;
        };

        severity = severity.max(entry.severity);
        causes.extend_from_slice(entry.causes);
        recommendations.extend_from_slice(entry.recommendations);
    }

    TriageResult {
        severity,
        summary: summary_for(severity).to_string(),
        recommendations: dedup_first(recommendations, MAX_RECOMMENDATIONS),
        causes: dedup_first(causes, MAX_CAUSES),
        disclaimer: DISCLAIMER.to_string(),
    }
}

/// Keep the first occurrence of each item, then cut to `limit`.
fn dedup_first(items: Vec<&str>, limit: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(*item))
        .take(limit)
        .map(str::to_string)
        .collect()
}

/// Symptom analysis with a nominal processing delay.
///
/// Callers must not start a second `analyze` for the same selection while
/// one is pending; there is no queueing or cancellation here.
#[derive(Debug, Clone)]
pub struct TriageEngine {
    delay: Duration,
}

impl Default for TriageEngine {
    fn default() -> Self {
        Self::new(DEFAULT_TRIAGE_DELAY)
    }
}

impl TriageEngine {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub async fn analyze<S: AsRef<str>>(&self, symptom_ids: &[S]) -> TriageResult {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let result = aggregate(symptom_ids);
        log_info!(
            "triage of {} symptom(s) finished: {}",
            symptom_ids.len(),
            result.severity.as_str()
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_mild_with_no_advice() {
        let result = aggregate::<&str>(&[]);
        assert_eq!(result.severity, Severity::Mild);
        assert!(result.recommendations.is_empty());
        assert!(result.causes.is_empty());
        assert_eq!(result.summary, MILD_SUMMARY);
        assert_eq!(result.disclaimer, DISCLAIMER);
    }

    #[test]
    fn unknown_ids_are_skipped() {
        let result = aggregate(&["sore_elbow", "", "HEADACHE"]);
        assert_eq!(result.severity, Severity::Mild);
        assert!(result.causes.is_empty());

        let mixed = aggregate(&["sore_elbow", "fever"]);
        assert_eq!(mixed, aggregate(&["fever"]));
    }

    #[test]
    fn chest_pain_is_severe() {
        let result = aggregate(&["chest_pain"]);
        assert_eq!(result.severity, Severity::Severe);
        assert_eq!(result.summary, SEVERE_SUMMARY);
        assert!(result
            .recommendations
            .iter()
            .any(|r| r == "Seek immediate medical attention"));

        let allowed = knowledge_base::lookup("chest_pain").unwrap().causes;
        assert!(result.causes.iter().all(|c| allowed.contains(&c.as_str())));
    }

    #[test]
    fn headache_then_fatigue_keeps_headache_advice_first() {
        let result = aggregate(&["headache", "fatigue"]);
        assert_eq!(result.severity, Severity::Mild);
        assert_eq!(
            result.recommendations,
            vec![
                "Rest in a quiet, dark room",
                "Stay hydrated",
                "Apply cold compress",
                "Ensure adequate sleep",
                "Eat balanced meals",
            ]
        );
        assert_eq!(result.causes, vec!["tension", "dehydration", "stress"]);
    }

    #[test]
    fn severity_is_max_over_matches_regardless_of_order() {
        assert_eq!(aggregate(&["cough", "fever"]).severity, Severity::Moderate);
        assert_eq!(aggregate(&["fever", "cough"]).severity, Severity::Moderate);
        assert_eq!(
            aggregate(&["breathing", "headache", "nausea"]).severity,
            Severity::Severe
        );
        assert_eq!(aggregate(&["dizziness"]).summary, MODERATE_SUMMARY);
    }

    #[test]
    fn lists_are_deduplicated_and_capped() {
        let all: Vec<&str> = knowledge_base::entries().iter().map(|e| e.id).collect();
        let result = aggregate(&all);

        assert!(result.recommendations.len() <= MAX_RECOMMENDATIONS);
        assert!(result.causes.len() <= MAX_CAUSES);

        let unique: HashSet<&String> = result.recommendations.iter().collect();
        assert_eq!(unique.len(), result.recommendations.len());
    }

    #[test]
    fn duplicate_ids_do_not_duplicate_advice() {
        let once = aggregate(&["fever"]);
        let twice = aggregate(&["fever", "fever"]);
        assert_eq!(once, twice);
    }

    #[test]
    fn shared_recommendation_keeps_first_position() {
        // "Stay hydrated" is second for fever and first for cough.
        let result = aggregate(&["fever", "cough"]);
        assert_eq!(
            result.recommendations,
            vec![
                "Monitor temperature regularly",
                "Stay hydrated",
                "Rest",
                "Consider fever reducer",
                "Use honey for throat relief",
            ]
        );
    }

    #[test]
    fn result_serializes_causes_as_possible_causes() {
        let json = serde_json::to_value(aggregate(&["cough"])).unwrap();
        assert_eq!(json["severity"], "mild");
        assert!(json.get("possibleCauses").is_some());
        assert!(json.get("causes").is_none());
    }

    #[tokio::test]
    async fn analyze_without_delay_matches_aggregate() {
        let engine = TriageEngine::new(Duration::ZERO);
        let ids = vec!["nausea".to_string(), "headache".to_string()];
        assert_eq!(engine.analyze(&ids).await, aggregate(&ids));
    }

    #[tokio::test]
    async fn analyze_waits_for_the_configured_delay() {
        let engine = TriageEngine::new(Duration::from_millis(30));
        let started = std::time::Instant::now();
        let result = engine.analyze(&["fatigue"]).await;
        assert!(started.elapsed() >= Duration::from_millis(30));
        assert_eq!(result.severity, Severity::Mild);
    }
}
