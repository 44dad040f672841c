use auth_token::Claims;
use axum::http::{HeaderMap, HeaderValue, header::InvalidHeaderValue};
use uuid::Uuid;

use crate::services::proxy::{X_USER_ID, X_USER_ROLE, X_USERNAME};

/// Identity headers derived from a verified token.
///
/// Only built from claims that passed verification, and only ever written to
/// the outgoing backend request, never to the caller's request or response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardedIdentity {
    user_id: Uuid,
    user_id_value: HeaderValue,
    username: HeaderValue,
    role: HeaderValue,
}

impl ForwardedIdentity {
    /// Fails when a claim cannot travel as a header value (control characters).
    pub fn from_claims(claims: &Claims) -> Result<Self, InvalidHeaderValue> {
        let user_id_value = HeaderValue::from_str(&claims.user_id.to_string())?;
        // Raw bytes: non-ASCII names are passed through as obs-text.
        let username = HeaderValue::from_bytes(claims.username.as_bytes())?;
        let role = HeaderValue::from_bytes(claims.role_or_default().as_bytes())?;

        Ok(Self {
            user_id: claims.user_id,
            user_id_value,
            username,
            role,
        })
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    /// Overwrite the identity headers in `headers` with this identity.
    pub fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(X_USER_ID, self.user_id_value.clone());
        headers.insert(X_USERNAME, self.username.clone());
        headers.insert(X_USER_ROLE, self.role.clone());
    }
}
