use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Faults in a studio request itself.
///
/// Failures reported by the API server are not errors here: they are shown
/// as a banner on the re-rendered view.
#[derive(Debug, Error)]
pub enum StudioError {
    #[error("Unknown form action: {0}")]
    UnknownAction(String),

    #[error("Invalid form field: {0}")]
    InvalidField(String),
}

impl IntoResponse for StudioError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self {
            StudioError::UnknownAction(_) => (StatusCode::BAD_REQUEST, "UNKNOWN_ACTION"),
            StudioError::InvalidField(_) => (StatusCode::BAD_REQUEST, "INVALID_FIELD"),
        };
        tracing::debug!(code = error_code, error = %self, "rejected studio request");

        let body = Json(json!({
            "success": false,
            "error": {
                "code": error_code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, StudioError>;
