pub mod age;
pub mod blood_pressure;
pub mod temperature;

use serde::Serialize;

use crate::patient::PatientRecord;

/// Outcome of scoring one clinical field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldScore {
    pub score: u8,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

impl FieldScore {
    pub fn invalid() -> Self {
        Self {
            score: 0,
            valid: false,
            value: None,
        }
    }

    pub fn valid(score: u8, value: Option<f64>) -> Self {
        Self {
            score,
            valid: true,
            value,
        }
    }
}

pub trait FieldScorer {
    fn name(&self) -> &'static str;
    fn score(&self, patient: &PatientRecord) -> FieldScore;
}
