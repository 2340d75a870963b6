use crate::numeric::parse_numeric_str;
use crate::patient::{FieldValue, PatientRecord};

use super::{FieldScore, FieldScorer};

const SYSTOLIC_RANGE: std::ops::RangeInclusive<f64> = 0.0..=300.0;
const DIASTOLIC_RANGE: std::ops::RangeInclusive<f64> = 0.0..=200.0;

pub struct BloodPressureScorer;

impl FieldScorer for BloodPressureScorer {
    fn name(&self) -> &'static str {
        "blood_pressure"
    }

    fn score(&self, patient: &PatientRecord) -> FieldScore {
        score_blood_pressure(patient.blood_pressure.as_ref())
    }
}

/// Score a `"systolic/diastolic"` reading. The highest matching stage wins.
pub fn score_blood_pressure(value: Option<&FieldValue>) -> FieldScore {
    let Some(FieldValue::Text(raw)) = value else {
        return FieldScore::invalid();
    };
    let Some((systolic, diastolic)) = parse_reading(raw) else {
        return FieldScore::invalid();
    };

    let score = if systolic >= 140.0 || diastolic >= 90.0 {
        3
    } else if (130.0..=139.0).contains(&systolic) || (80.0..=89.0).contains(&diastolic) {
        2
    } else if (120.0..=129.0).contains(&systolic) && diastolic < 80.0 {
        1
    } else {
        0
    };

    FieldScore::valid(score, None)
}

fn parse_reading(raw: &str) -> Option<(f64, f64)> {
    let trimmed = raw.trim();
    if trimmed.is_empty()
        || ["n/a", "null", "undefined"]
            .iter()
            .any(|token| trimmed.eq_ignore_ascii_case(token))
    {
        return None;
    }

    let parts: Vec<&str> = trimmed.split('/').map(str::trim).collect();
    let [systolic, diastolic] = parts.as_slice() else {
        return None;
    };
    if systolic.is_empty() || diastolic.is_empty() {
        return None;
    }

    let systolic = parse_numeric_str(systolic)?;
    let diastolic = parse_numeric_str(diastolic)?;
    if !SYSTOLIC_RANGE.contains(&systolic) || !DIASTOLIC_RANGE.contains(&diastolic) {
        return None;
    }
    Some((systolic, diastolic))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bp(raw: &str) -> FieldScore {
        score_blood_pressure(Some(&FieldValue::from(raw)))
    }

    #[test]
    fn stage_two_hypertension() {
        assert_eq!(bp("145/95").score, 3);
        assert_eq!(bp("141/70").score, 3);
        assert_eq!(bp("118/92").score, 3);
        assert!(bp("145/95").valid);
    }

    #[test]
    fn stage_one_driven_by_either_side() {
        assert_eq!(bp("135/85").score, 2);
        assert_eq!(bp("110/85").score, 2);
        assert_eq!(bp("132/70").score, 2);
    }

    #[test]
    fn elevated_needs_low_diastolic() {
        assert_eq!(bp("125/75").score, 1);
        assert_eq!(bp("120/79").score, 1);
        assert_eq!(bp("125/82").score, 2);
    }

    #[test]
    fn normal_reading() {
        let result = bp("115/70");
        assert_eq!(result.score, 0);
        assert!(result.valid);
    }

    #[test]
    fn highest_stage_wins() {
        // systolic alone says elevated, diastolic says stage 2
        assert_eq!(bp("125/95").score, 3);
    }

    #[test]
    fn whitespace_around_parts_is_tolerated() {
        assert_eq!(bp(" 150 / 85 ").score, 3);
    }

    #[test]
    fn malformed_readings_invalid() {
        for raw in ["150/", "/90", "not/valid", "120", "120/80/70", "", "   ", "N/A", "null", "UNDEFINED"] {
            let result = bp(raw);
            assert!(!result.valid, "{raw:?} should be invalid");
            assert_eq!(result.score, 0);
        }
    }

    #[test]
    fn out_of_range_invalid() {
        assert!(!bp("301/80").valid);
        assert!(!bp("120/201").valid);
        assert!(!bp("-5/80").valid);
        assert!(bp("300/200").valid);
    }

    #[test]
    fn non_string_input_invalid() {
        assert!(!score_blood_pressure(None).valid);
        assert!(!score_blood_pressure(Some(&FieldValue::Number(120.0))).valid);
    }
}
