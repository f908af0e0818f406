use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use signal_core::AnalyzerError;

/// Analyzer errors mapped onto HTTP responses with a stable error code
#[derive(Debug)]
pub struct AppError(pub AnalyzerError);

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self(AnalyzerError::Validation(message.into()))
    }
}

impl From<AnalyzerError> for AppError {
    fn from(err: AnalyzerError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            AnalyzerError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AnalyzerError::DataSource(_) => (StatusCode::BAD_GATEWAY, "DATA_SOURCE_ERROR"),
            AnalyzerError::InsufficientData(_)
            | AnalyzerError::Chart(_)
            | AnalyzerError::Analysis { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "ANALYSIS_ERROR")
            }
        };

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        } else {
            tracing::warn!("Request rejected: {}", self.0);
        }

        let body = Json(json!({
            "success": false,
            "error": self.0.to_string(),
            "code": code,
        }));

        (status, body).into_response()
    }
}
