use axum::{Router, routing::post};

use crate::api::handlers::auth::{login, register};
use crate::state::AppState;

/// Mounted under `/api/auth`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}
