use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::AlertThresholds;
use crate::patient::PatientRecord;
use crate::profile::build_profile;

/// Body of `POST /submit-assessment`. Every list is deduplicated and sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertsPayload {
    pub high_risk_patients: Vec<String>,
    pub fever_patients: Vec<String>,
    pub data_quality_issues: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AlertsSummary {
    pub processed: usize,
    pub skipped: usize,
    pub high_risk: usize,
    pub fever: usize,
    pub data_quality: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Aggregation {
    pub alerts: AlertsPayload,
    pub summary: AlertsSummary,
}

#[derive(Default)]
struct Buckets {
    high_risk: BTreeSet<String>,
    fever: BTreeSet<String>,
    data_quality: BTreeSet<String>,
}

/// Bucket every patient with a usable identifier into the alert lists.
///
/// Patients without a usable `patient_id` are dropped from all buckets and
/// reported through a warning. A patient can land in several buckets.
pub fn aggregate_alerts(patients: &[PatientRecord], thresholds: &AlertThresholds) -> Aggregation {
    let mut buckets = Buckets::default();
    let mut processed = 0;
    let mut skipped = 0;

    for (index, patient) in patients.iter().enumerate() {
        let patient_id = match patient.patient_id.as_ref().map(|id| id.canonical()) {
            Some(Ok(id)) => id,
            Some(Err(reason)) => {
                tracing::warn!(index, reason, id = ?patient.patient_id, "skipping patient");
                skipped += 1;
                continue;
            }
            None => {
                tracing::warn!(index, "skipping patient without patient_id");
                skipped += 1;
                continue;
            }
        };

        let profile = build_profile(patient_id, patient, thresholds);
        processed += 1;

        if profile.has_data_quality_issue {
            tracing::debug!(
                patient_id = %profile.patient_id,
                fields = ?profile.invalid_fields,
                "data quality issue"
            );
            buckets.data_quality.insert(profile.patient_id.clone());
        }
        if profile.has_fever {
            buckets.fever.insert(profile.patient_id.clone());
        }
        if profile.total_score >= thresholds.high_risk_total {
            buckets.high_risk.insert(profile.patient_id);
        }
    }

    let summary = AlertsSummary {
        processed,
        skipped,
        high_risk: buckets.high_risk.len(),
        fever: buckets.fever.len(),
        data_quality: buckets.data_quality.len(),
    };
    tracing::info!(
        processed,
        skipped,
        high_risk = summary.high_risk,
        fever = summary.fever,
        data_quality = summary.data_quality,
        "alerts aggregated"
    );

    // BTreeSet iteration is already ascending.
    Aggregation {
        alerts: AlertsPayload {
            high_risk_patients: buckets.high_risk.into_iter().collect(),
            fever_patients: buckets.fever.into_iter().collect(),
            data_quality_issues: buckets.data_quality.into_iter().collect(),
        },
        summary,
    }
}
