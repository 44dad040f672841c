//! Bearer token extraction and verification.

use auth_token::{TokenCodec, VerificationFailure};
use axum::http::{HeaderMap, header};
use thiserror::Error;

use crate::api::extractors::ForwardedIdentity;

/// Why a request carries no usable identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthFailure {
    #[error("no token supplied")]
    NoToken,
    #[error("token rejected: {0}")]
    Rejected(VerificationFailure),
}

/// Token from `Authorization: Bearer <token>`.
///
/// The scheme is case-sensitive and separated by exactly one space; any
/// other shape counts as no token at all.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let token = headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")?;

    if token.is_empty() || token.contains(char::is_whitespace) {
        return None;
    }
    Some(token)
}

/// Verify the request's bearer token and derive the identity to forward.
pub fn authenticate(
    codec: &TokenCodec,
    headers: &HeaderMap,
) -> Result<ForwardedIdentity, AuthFailure> {
    let token = bearer_token(headers).ok_or(AuthFailure::NoToken)?;

    let claims = codec.verify(token).map_err(AuthFailure::Rejected)?;

    ForwardedIdentity::from_claims(&claims)
        .map_err(|_| AuthFailure::Rejected(VerificationFailure::Malformed))
}
