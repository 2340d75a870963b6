use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use vitalwatch_scoring::{aggregate_alerts, AlertThresholds, AlertsPayload, AlertsSummary, PatientRecord};

use super::client::{ClinicalApiClient, ClinicalApiError};

/// The two calls a run makes against the clinical API.
#[async_trait]
pub trait AssessmentApi: Send + Sync {
    async fn fetch_patients(&self) -> Result<Vec<PatientRecord>, ClinicalApiError>;
    async fn submit_alerts(&self, alerts: &AlertsPayload) -> Result<Value, ClinicalApiError>;
}

#[async_trait]
impl AssessmentApi for ClinicalApiClient {
    async fn fetch_patients(&self) -> Result<Vec<PatientRecord>, ClinicalApiError> {
        self.fetch_all_patients().await
    }

    async fn submit_alerts(&self, alerts: &AlertsPayload) -> Result<Value, ClinicalApiError> {
        self.submit_assessment(alerts).await
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AssessmentOutcome {
    pub patient_count: usize,
    pub summary: AlertsSummary,
    pub alerts: AlertsPayload,
    pub submission: Value,
}

/// Fetch every patient, bucket them into alerts and submit the result.
///
/// Any fetch failure aborts the run before anything is submitted.
pub async fn run_assessment<A>(
    api: &A,
    thresholds: &AlertThresholds,
) -> Result<AssessmentOutcome, ClinicalApiError>
where
    A: AssessmentApi + ?Sized,
{
    let patients = api.fetch_patients().await?;
    let aggregation = aggregate_alerts(&patients, thresholds);

    tracing::info!(
        patients = patients.len(),
        high_risk = aggregation.summary.high_risk,
        fever = aggregation.summary.fever,
        data_quality = aggregation.summary.data_quality,
        "submitting assessment"
    );
    let submission = api.submit_alerts(&aggregation.alerts).await?;

    Ok(AssessmentOutcome {
        patient_count: patients.len(),
        summary: aggregation.summary,
        alerts: aggregation.alerts,
        submission,
    })
}
