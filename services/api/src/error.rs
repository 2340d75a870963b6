use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use vitalwatch_common::error::VitalwatchError;

pub struct ApiError(pub VitalwatchError);

impl From<VitalwatchError> for ApiError {
    fn from(err: VitalwatchError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            VitalwatchError::Upstream(_) => StatusCode::BAD_GATEWAY,
            VitalwatchError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, Json(body)).into_response()
    }
}
