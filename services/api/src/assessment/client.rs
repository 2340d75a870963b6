use std::time::Duration;

use reqwest::header::RETRY_AFTER;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use vitalwatch_common::error::{VitalwatchError, VitalwatchResult};
use vitalwatch_config::env_or;
use vitalwatch_scoring::{AlertsPayload, PatientRecord};

use super::pagination::{extract_page, records_from_entries, PaginationMeta, PaginationState};
use super::retry::{declared_retry_after, retry_with, RetryError, RetryPolicy};

const DEFAULT_BASE_URL: &str = "https://assessment.ksensetech.com/api";

#[derive(Debug, Clone)]
pub struct ClinicalApiConfig {
    pub base_url: String,
    pub api_key: String,
    pub page_size: usize,
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub rate_limit_delay_ms: u64,
    pub page_delay_ms: u64,
    pub timeout_secs: u64,
}

impl ClinicalApiConfig {
    /// Load clinical API settings from the environment.
    ///
    /// Everything except `CLINICAL_API_KEY` has a default; a missing key is
    /// a configuration error.
    pub fn from_env() -> VitalwatchResult<Self> {
        let _ = dotenvy::dotenv();

        let api_key = std::env::var("CLINICAL_API_KEY")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| {
                VitalwatchError::Config("CLINICAL_API_KEY is required but not set".to_string())
            })?;

        Ok(Self {
            base_url: std::env::var("CLINICAL_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            api_key,
            page_size: env_or("CLINICAL_API_PAGE_SIZE", 20usize).max(1),
            max_retries: env_or("CLINICAL_API_MAX_RETRIES", 5),
            base_delay_ms: env_or("CLINICAL_API_BASE_DELAY_MS", 1000),
            max_delay_ms: env_or("CLINICAL_API_MAX_DELAY_MS", 30_000),
            rate_limit_delay_ms: env_or("CLINICAL_API_RATE_LIMIT_DELAY_MS", 2000),
            page_delay_ms: env_or("CLINICAL_API_PAGE_DELAY_MS", 500),
            timeout_secs: env_or("CLINICAL_API_TIMEOUT_SECS", 30),
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay: Duration::from_millis(self.base_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            rate_limit_step: Duration::from_millis(self.rate_limit_delay_ms),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClinicalApiError {
    #[error("HTTP {status}: {body}")]
    HttpError {
        status: StatusCode,
        body: String,
        retry_after: Option<String>,
    },

    #[error("request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("invalid response body: {0}")]
    DecodeError(String),

    #[error("max retries exceeded after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded {
        attempts: u32,
        last_error: Box<ClinicalApiError>,
    },
}

impl ClinicalApiError {
    /// Network failures without a status, 429 and 5xx are worth another try.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::HttpError { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            Self::RequestError(e) => !e.is_builder(),
            Self::DecodeError(_) | Self::MaxRetriesExceeded { .. } => false,
        }
    }

    fn backoff(&self, policy: &RetryPolicy, attempt: u32) -> Duration {
        match self {
            Self::HttpError {
                status,
                body,
                retry_after,
            } if *status == StatusCode::TOO_MANY_REQUESTS => {
                let declared = declared_retry_after(retry_after.as_deref(), body);
                policy.rate_limit_delay(declared, attempt)
            }
            _ => policy.exponential_delay(attempt, policy.jitter()),
        }
    }
}

impl From<RetryError<ClinicalApiError>> for ClinicalApiError {
    fn from(err: RetryError<ClinicalApiError>) -> Self {
        match err {
            RetryError::Fatal(e) => e,
            RetryError::Exhausted { attempts, last } => Self::MaxRetriesExceeded {
                attempts,
                last_error: Box::new(last),
            },
        }
    }
}

#[derive(Clone)]
pub struct ClinicalApiClient {
    client: Client,
    config: ClinicalApiConfig,
    policy: RetryPolicy,
}

impl ClinicalApiClient {
    pub fn new(config: ClinicalApiConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let policy = config.retry_policy();
        Ok(Self {
            client,
            config,
            policy,
        })
    }

    /// For testing: point the client at a specific base URL (e.g., wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.config.base_url = base_url.to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    /// Walk the listing endpoint page by page until no signal points at more data.
    pub async fn fetch_all_patients(&self) -> Result<Vec<PatientRecord>, ClinicalApiError> {
        let limit = self.config.page_size;
        let page_delay = Duration::from_millis(self.config.page_delay_ms);
        let mut state = PaginationState::default();
        let mut patients = Vec::new();

        while state.should_fetch() {
            let page = state.page;
            let url = format!("{}/patients?page={}&limit={}", self.base_url(), page, limit);
            let text = self.send_with_retry(Method::GET, &url, None).await?;
            let body: Value = serde_json::from_str(&text)
                .map_err(|e| ClinicalApiError::DecodeError(format!("page {page}: {e}")))?;

            let entries: &[Value] = match extract_page(&body) {
                Some((shape, entries)) => {
                    tracing::debug!(page, shape, count = entries.len(), "page fetched");
                    entries
                }
                None => {
                    tracing::warn!(page, "unrecognized page shape, treating as empty");
                    &[]
                }
            };

            patients.extend(records_from_entries(page, entries));
            let meta = PaginationMeta::from_body(&body);
            if let Some(m) = &meta {
                tracing::debug!(
                    page,
                    reported_page = ?m.page,
                    total = ?m.total,
                    total_pages = ?m.total_pages,
                    has_next = ?m.has_next,
                    "pagination metadata"
                );
            }
            state.advance(meta.as_ref(), entries.len(), limit);

            if state.should_fetch() && !page_delay.is_zero() {
                tokio::time::sleep(page_delay).await;
            }
        }

        if state.hit_safety_cap() {
            tracing::warn!(
                last_page = state.page - 1,
                "page iteration cap reached with more data indicated"
            );
        }
        tracing::info!(count = patients.len(), "fetched patients");

        Ok(patients)
    }

    /// Post the alert lists and hand back whatever the API answered.
    ///
    /// A non-JSON answer is returned as a JSON string, an empty one as null.
    pub async fn submit_assessment(&self, alerts: &AlertsPayload) -> Result<Value, ClinicalApiError> {
        let url = format!("{}/submit-assessment", self.base_url());
        let text = self.send_with_retry(Method::POST, &url, Some(alerts)).await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }

    async fn send_with_retry(
        &self,
        method: Method,
        url: &str,
        body: Option<&AlertsPayload>,
    ) -> Result<String, ClinicalApiError> {
        let policy = &self.policy;
        let text = retry_with(
            policy.max_retries,
            move || self.send_once(method.clone(), url, body),
            ClinicalApiError::is_retryable,
            |err: &ClinicalApiError, attempt: u32| err.backoff(policy, attempt),
        )
        .await?;
        Ok(text)
    }

    async fn send_once(
        &self,
        method: Method,
        url: &str,
        body: Option<&AlertsPayload>,
    ) -> Result<String, ClinicalApiError> {
        let mut request = self
            .client
            .request(method, url)
            .header("x-api-key", &self.config.api_key);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.text().await?);
        }

        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = response.text().await.unwrap_or_default();
        Err(ClinicalApiError::HttpError {
            status,
            body,
            retry_after,
        })
    }
}
