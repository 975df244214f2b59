//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use lampctl_domain::error::LampError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`LampError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(LampError);

impl From<LampError> for ApiError {
    fn from(err: LampError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            LampError::Command(_) => (StatusCode::BAD_REQUEST, self.0.to_string()),
            LampError::Busy => (StatusCode::CONFLICT, self.0.to_string()),
            other => {
                tracing::error!(error = ?other, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
