use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::GatewayError;
use crate::services::proxy::RoutePolicy;

use super::ForwardedIdentity;

/// The route the auth policy middleware resolved for this request.
#[derive(Debug, Clone)]
pub struct MatchedRoute(pub Arc<RoutePolicy>);

impl<S> FromRequestParts<S> for MatchedRoute
where
    S: Send + Sync,
{
    type Rejection = GatewayError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Missing means the middleware was not layered in front of the handler,
        // or no route matched.
        parts
            .extensions
            .get::<MatchedRoute>()
            .cloned()
            .ok_or(GatewayError::NotFound)
    }
}

/// Identity verified for this request, `None` when the request carries none.
#[derive(Debug, Clone)]
pub struct VerifiedIdentity(pub Option<ForwardedIdentity>);

impl<S> FromRequestParts<S> for VerifiedIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(VerifiedIdentity(
            parts.extensions.get::<ForwardedIdentity>().cloned(),
        ))
    }
}
