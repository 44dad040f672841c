/*
 * Responsibility
 * - GET /health (liveness only, no auth, no backend calls)
 */
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({"status": "ok", "service": "api-gateway"})),
    )
}
