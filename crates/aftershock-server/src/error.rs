//! Error types for the HTTP surface.
//!
//! [`ApiError`] converts into an Axum response with a JSON body of the
//! form `{"error": <message>, "status": <code>}`.

use aftershock_db::DbError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors returned by the session API and dashboard.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// A query parameter was missing, malformed, or out of range.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// A UUID could not be parsed from the request path.
    #[error("invalid UUID: {0}")]
    InvalidUuid(String),

    /// The session history could not be read.
    #[error("persistence error: {0}")]
    Persistence(#[from] DbError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::InvalidQuery(msg) | Self::InvalidUuid(msg) => {
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            Self::Persistence(e) => (StatusCode::SERVICE_UNAVAILABLE, e.to_string()),
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
