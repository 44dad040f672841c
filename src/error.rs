/*
 * Responsibility
 * - Gateway-wide error type and its HTTP rendering
 * - Every synthesized failure uses the same `{"message": ...}` envelope;
 *   completed backend responses never pass through here
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::middleware::auth::AuthFailure;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("unauthorized: {0}")]
    Unauthorized(#[from] AuthFailure),
    #[error("not found")]
    NotFound,
    #[error("request body too large")]
    PayloadTooLarge,
    #[error("invalid request body")]
    BadRequest,
    #[error("invalid request path")]
    InvalidPath,
    #[error("{service} unavailable")]
    Unavailable { service: String },
}

impl GatewayError {
    pub fn unavailable(service: impl Into<String>) -> Self {
        Self::Unavailable {
            service: service.into(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            // Verification details stay in the logs.
            GatewayError::Unauthorized(AuthFailure::NoToken) => {
                (StatusCode::UNAUTHORIZED, "No token supplied".to_string())
            }
            GatewayError::Unauthorized(_) => {
                (StatusCode::UNAUTHORIZED, "Invalid or expired token".to_string())
            }
            GatewayError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
            GatewayError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "Request body too large".to_string(),
            ),
            GatewayError::BadRequest => {
                (StatusCode::BAD_REQUEST, "Invalid request body".to_string())
            }
            GatewayError::InvalidPath => {
                (StatusCode::BAD_REQUEST, "Invalid request path".to_string())
            }
            GatewayError::Unavailable { .. } => (StatusCode::SERVICE_UNAVAILABLE, self.to_string()),
        };

        (status, Json(ErrorResponse { message })).into_response()
    }
}
