use crate::numeric::parse_numeric;
use crate::patient::{FieldValue, PatientRecord};

use super::{FieldScore, FieldScorer};

pub struct AgeScorer;

impl FieldScorer for AgeScorer {
    fn name(&self) -> &'static str {
        "age"
    }

    fn score(&self, patient: &PatientRecord) -> FieldScore {
        score_age(patient.age.as_ref())
    }
}

/// Score age in whole years; fractional or out-of-range ages are invalid.
pub fn score_age(value: Option<&FieldValue>) -> FieldScore {
    let Some(age) = parse_numeric(value) else {
        return FieldScore::invalid();
    };
    if age.fract() != 0.0 || !(0.0..=150.0).contains(&age) {
        return FieldScore::invalid();
    }

    let score = if age > 65.0 {
        2
    } else if age >= 40.0 {
        1
    } else {
        0
    };
    FieldScore::valid(score, Some(age))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn age(v: f64) -> FieldScore {
        score_age(Some(&FieldValue::Number(v)))
    }

    #[test]
    fn age_brackets() {
        assert_eq!(age(70.0).score, 2);
        assert_eq!(age(45.0).score, 1);
        assert_eq!(age(30.0).score, 0);
        assert!(age(30.0).valid);
    }

    #[test]
    fn bracket_edges() {
        assert_eq!(age(65.0).score, 1);
        assert_eq!(age(66.0).score, 2);
        assert_eq!(age(40.0).score, 1);
        assert_eq!(age(39.0).score, 0);
        assert!(age(0.0).valid);
        assert!(age(150.0).valid);
    }

    #[test]
    fn string_ages_parse() {
        assert_eq!(score_age(Some(&"72".into())).score, 2);
        assert_eq!(score_age(Some(&" 41 ".into())).score, 1);
    }

    #[test]
    fn rejects_fractional_and_out_of_range() {
        assert!(!age(45.5).valid);
        assert!(!age(-1.0).valid);
        assert!(!age(200.0).valid);
        assert!(!age(151.0).valid);
    }

    #[test]
    fn rejects_unparseable() {
        assert!(!score_age(Some(&"fifty-three".into())).valid);
        assert!(!score_age(Some(&"unknown".into())).valid);
        assert!(!score_age(None).valid);
    }
}
