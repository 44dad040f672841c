use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::claims::{Claims, Identity};
use crate::error::{IssueError, VerificationFailure};
use crate::secret::SigningSecret;

/// HS256 token issuer/verifier.
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("validation", &self.validation)
            .finish()
    }
}

impl TokenCodec {
    pub fn new(secret: &SigningSecret) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against an explicit clock in `verify_at`.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Issue a token for `identity` that expires `ttl` from now.
    pub fn issue(&self, identity: &Identity, ttl: Duration) -> Result<String, IssueError> {
        self.issue_at(identity, ttl, Utc::now())
    }

    pub fn issue_at(
        &self,
        identity: &Identity,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, IssueError> {
        let ttl = i64::try_from(ttl.as_secs()).map_err(|_| IssueError::TtlOutOfRange)?;
        let iat = now.timestamp();
        let exp = iat.checked_add(ttl).ok_or(IssueError::TtlOutOfRange)?;

        let claims = Claims {
            user_id: identity.user_id,
            username: identity.username.clone(),
            role: identity.role.clone(),
            iat,
            exp,
        };

        let mut header = Header::new(Algorithm::HS256);
        header.typ = Some("JWT".to_string());
        Ok(jsonwebtoken::encode(&header, &claims, &self.encoding_key)?)
    }

    /// Verify signature and expiry against the wall clock.
    pub fn verify(&self, token: &str) -> Result<Claims, VerificationFailure> {
        self.verify_at(token, Utc::now())
    }

    /// Verify signature and expiry as of `now`.
    ///
    /// An expired token reports `Expired` whether or not its signature holds.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, VerificationFailure> {
        let unverified = jsonwebtoken::dangerous::insecure_decode::<Claims>(token)
            .map_err(|_| VerificationFailure::Malformed)?;

        if unverified.claims.is_expired_at(now.timestamp()) {
            return Err(VerificationFailure::Expired);
        }

        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}
