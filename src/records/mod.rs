pub mod commands;
pub mod models;
pub mod store;

pub use models::{HealthMetric, MetricKind, RecordResult, SymptomRecord};
pub use store::RecordStore;
