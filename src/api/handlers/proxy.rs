//! Forward a routed request to its backend and relay the answer.
//!
//! Transport failures become a single 503 naming the backend; completed
//! backend responses (any status) are relayed unchanged.

use std::error::Error as StdError;

use axum::{
    body::Bytes,
    extract::{Request, State},
    response::{IntoResponse, Response},
};
use http_body_util::LengthLimitError;

use crate::api::extractors::{MatchedRoute, VerifiedIdentity};
use crate::error::GatewayError;
use crate::services::proxy::outbound_headers;
use crate::state::AppState;

pub async fn forward(
    State(state): State<AppState>,
    MatchedRoute(route): MatchedRoute,
    VerifiedIdentity(identity): VerifiedIdentity,
    req: Request,
) -> Result<Response, GatewayError> {
    let (parts, body) = req.into_parts();

    let url = route.upstream_url(&parts.uri);

    let mut headers = outbound_headers(&parts.headers);
    if let Some(identity) = &identity {
        identity.apply(&mut headers);
    }

    // The body size is bounded by the HTTP layer.
    let body: Bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(|err| {
            if exceeds_limit(&err) {
                GatewayError::PayloadTooLarge
            } else {
                tracing::warn!(error = %err, "failed to read request body");
                GatewayError::BadRequest
            }
        })?;

    tracing::debug!(
        method = %parts.method,
        upstream = %url,
        service = route.service(),
        authenticated = identity.is_some(),
        "forwarding request"
    );

    match state.upstream.send(parts.method, url, headers, body).await {
        Ok(proxied) => Ok(proxied.into_response()),
        Err(err) => {
            tracing::error!(
                error = %err,
                timeout = err.is_timeout(),
                service = route.service(),
                "proxy error"
            );
            Err(GatewayError::unavailable(route.service()))
        }
    }
}

fn exceeds_limit(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return true;
        }
        source = e.source();
    }
    false
}
