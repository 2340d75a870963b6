use serde::Serialize;

use crate::config::AlertThresholds;
use crate::patient::PatientRecord;
use crate::scorers::age::AgeScorer;
use crate::scorers::blood_pressure::BloodPressureScorer;
use crate::scorers::temperature::TemperatureScorer;
use crate::scorers::FieldScorer;

/// Per-patient risk derived from the three clinical fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskProfile {
    pub patient_id: String,
    pub bp_score: u8,
    pub temperature_score: u8,
    pub age_score: u8,
    pub total_score: u8,
    pub has_fever: bool,
    pub has_data_quality_issue: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature_value: Option<f64>,
    /// Names of the fields that failed validation.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub invalid_fields: Vec<&'static str>,
}

pub fn build_profile(
    patient_id: String,
    patient: &PatientRecord,
    thresholds: &AlertThresholds,
) -> RiskProfile {
    let bp = BloodPressureScorer.score(patient);
    let temperature = TemperatureScorer.score(patient);
    let age = AgeScorer.score(patient);

    let invalid_fields: Vec<&'static str> = [
        (BloodPressureScorer.name(), bp),
        (TemperatureScorer.name(), temperature),
        (AgeScorer.name(), age),
    ]
    .into_iter()
    .filter(|(_, result)| !result.valid)
    .map(|(name, _)| name)
    .collect();

    // The alert threshold is compared exactly; only the score band has a tolerance.
    let has_fever = temperature.valid
        && temperature
            .value
            .is_some_and(|t| t >= thresholds.fever_alert_f);

    RiskProfile {
        patient_id,
        bp_score: bp.score,
        temperature_score: temperature.score,
        age_score: age.score,
        total_score: bp.score + temperature.score + age.score,
        has_fever,
        has_data_quality_issue: !invalid_fields.is_empty(),
        temperature_value: temperature.value,
        invalid_fields,
    }
}
