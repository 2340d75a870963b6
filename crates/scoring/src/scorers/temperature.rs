use crate::numeric::parse_numeric;
use crate::patient::{FieldValue, PatientRecord};

use super::{FieldScore, FieldScorer};

const HIGH_FEVER_F: f64 = 101.0;
const LOW_FEVER_MIN_F: f64 = 99.6;
const LOW_FEVER_MAX_F: f64 = 100.9;
/// Absorbs float round-trip error at the low-fever band edges only.
const BAND_EPSILON: f64 = 1e-6;
const PLAUSIBLE_RANGE_F: std::ops::RangeInclusive<f64> = 80.0..=115.0;

pub struct TemperatureScorer;

impl FieldScorer for TemperatureScorer {
    fn name(&self) -> &'static str {
        "temperature"
    }

    fn score(&self, patient: &PatientRecord) -> FieldScore {
        score_temperature(patient.temperature.as_ref())
    }
}

/// Score a Fahrenheit reading. High fevers skip the plausibility range.
pub fn score_temperature(value: Option<&FieldValue>) -> FieldScore {
    let Some(temp) = parse_numeric(value) else {
        return FieldScore::invalid();
    };

    if temp >= HIGH_FEVER_F {
        return FieldScore::valid(2, Some(temp));
    }
    if !PLAUSIBLE_RANGE_F.contains(&temp) {
        return FieldScore::invalid();
    }

    let low_fever = (LOW_FEVER_MIN_F - BAND_EPSILON..=LOW_FEVER_MAX_F + BAND_EPSILON).contains(&temp);
    FieldScore::valid(u8::from(low_fever), Some(temp))
}
