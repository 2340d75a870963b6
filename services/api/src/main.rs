mod assessment;
mod error;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use vitalwatch_common::error::VitalwatchError;
use vitalwatch_common::types::ServiceInfo;
use vitalwatch_config::{init_tracing, AppConfig};
use vitalwatch_scoring::{AlertThresholds, AlertsPayload};

use crate::assessment::client::{ClinicalApiClient, ClinicalApiConfig};
use crate::assessment::pipeline::{run_assessment, AssessmentApi};
use crate::error::ApiError;

const SERVICE_NAME: &str = "vitalwatch-api";

#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn AssessmentApi>,
    pub thresholds: AlertThresholds,
    pub info: ServiceInfo,
    /// Held for the length of a run so runs never overlap.
    pub run_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(api: Arc<dyn AssessmentApi>, info: ServiceInfo) -> Self {
        Self {
            api,
            thresholds: AlertThresholds::default(),
            info,
            run_lock: Arc::new(Mutex::new(())),
        }
    }
}

#[derive(Debug, Serialize)]
struct RunResponse {
    patients: usize,
    alerts: AlertsPayload,
    submission: Value,
}

async fn health() -> Json<Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn info(State(state): State<AppState>) -> Json<ServiceInfo> {
    Json(state.info.clone())
}

async fn run(State(state): State<AppState>) -> Result<Json<RunResponse>, ApiError> {
    let _guard = state.run_lock.lock().await;
    tracing::info!("assessment run started");

    let outcome = run_assessment(state.api.as_ref(), &state.thresholds)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "assessment run failed");
            VitalwatchError::Upstream(e.to_string())
        })?;

    tracing::info!(patients = outcome.patient_count, "assessment run finished");
    Ok(Json(RunResponse {
        patients: outcome.patient_count,
        alerts: outcome.alerts,
        submission: outcome.submission,
    }))
}

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/info", get(info))
        .route("/run", post(run))
        .with_state(state)
}

#[tokio::main]
async fn main() {
    let config = AppConfig::from_env().expect("failed to load config");
    init_tracing(&config.log_level);
    tracing::info!(service = SERVICE_NAME, "starting");

    let api_config = ClinicalApiConfig::from_env().expect("failed to load clinical api config");
    tracing::info!(
        base_url = %api_config.base_url,
        page_size = api_config.page_size,
        max_retries = api_config.max_retries,
        "clinical api configured"
    );

    let info = ServiceInfo::new(SERVICE_NAME, &api_config.base_url);
    let client = ClinicalApiClient::new(api_config).expect("failed to create clinical api client");
    let app = build_router(AppState::new(Arc::new(client), info));

    let addr: SocketAddr = config.bind_addr().parse().expect("invalid bind address");
    tracing::info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind");
    axum::serve(listener, app).await.expect("server error");
}
