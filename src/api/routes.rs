/*
 * Responsibility
 * - URL structure of the gateway
 * - /health is answered locally and never passes the auth policy
 * - Everything else falls through to the proxy, behind the auth policy
 */
use axum::{Router, routing::get};

use crate::api::handlers::{health::health, proxy::forward};
use crate::middleware;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router {
    let proxy = Router::new().fallback(forward);
    let proxy = middleware::auth::apply(proxy, state.clone()).with_state(state);

    Router::new()
        .route("/health", get(health))
        .fallback_service(proxy)
}
