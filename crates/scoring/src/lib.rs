pub mod alerts;
pub mod config;
pub mod numeric;
pub mod patient;
pub mod profile;
pub mod scorers;

pub use alerts::{aggregate_alerts, AlertsPayload, AlertsSummary, Aggregation};
pub use config::AlertThresholds;
pub use numeric::{parse_numeric, parse_numeric_str};
pub use patient::{FieldValue, PatientId, PatientRecord};
pub use profile::{build_profile, RiskProfile};
pub use scorers::FieldScore;
