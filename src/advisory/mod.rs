pub mod commands;
pub mod intent;
pub mod knowledge_base;
pub mod triage;
pub mod voice;

pub use intent::{Intent, IntentRouter};
pub use triage::{TriageEngine, TriageResult, DEFAULT_TRIAGE_DELAY};
pub use voice::{SymptomCommand, SymptomSelection};
