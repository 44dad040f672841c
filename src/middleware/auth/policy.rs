//! Route-aware authentication gate in front of the proxy handler.
//!
//! - Rejects paths with dot segments, then resolves the route for the
//!   request path (longest prefix).
//! - `Required`: rejects with 401 unless a valid bearer token is presented.
//! - `Optional`: attaches the identity when the token verifies, otherwise
//!   lets the request through with no identity at all.
//! - `None`: no token inspection.
//!
//! The route and identity travel to the handler as request extensions.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::api::extractors::{ForwardedIdentity, MatchedRoute};
use crate::error::GatewayError;
use crate::services::proxy::{AuthRequirement, has_dot_segment};
use crate::state::AppState;

use super::bearer::{AuthFailure, authenticate};

/// Layer the auth policy middleware onto the proxy router.
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, auth_policy))
}

async fn auth_policy(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, GatewayError> {
    let path = req.uri().path();
    if has_dot_segment(path) {
        tracing::debug!(path, "rejecting path with dot segments");
        return Err(GatewayError::InvalidPath);
    }

    let route = state
        .routes
        .match_path(path)
        .ok_or(GatewayError::NotFound)?;

    let identity: Option<ForwardedIdentity> = match route.auth() {
        AuthRequirement::None => None,
        AuthRequirement::Optional => match authenticate(&state.codec, req.headers()) {
            Ok(identity) => Some(identity),
            Err(AuthFailure::NoToken) => None,
            Err(err) => {
                tracing::debug!(error = %err, route = route.prefix(), "ignoring rejected token");
                None
            }
        },
        AuthRequirement::Required => match authenticate(&state.codec, req.headers()) {
            Ok(identity) => Some(identity),
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    route = route.prefix(),
                    "access token verification failed"
                );
                return Err(err.into());
            }
        },
    };

    if let Some(identity) = identity {
        tracing::debug!(user_id = %identity.user_id(), "identity attached");
        req.extensions_mut().insert(identity);
    }
    req.extensions_mut().insert(MatchedRoute(route));

    Ok(next.run(req).await)
}
