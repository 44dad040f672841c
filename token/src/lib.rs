//! Signed identity tokens shared by the credential service (issuer) and the
//! gateway (verifier).
//!
//! Tokens are HS256 JWTs keyed by a process-wide [`SigningSecret`].

mod claims;
mod codec;
mod error;
mod secret;

pub use claims::{Claims, DEFAULT_ROLE, Identity};
pub use codec::TokenCodec;
pub use error::{IssueError, SecretError, VerificationFailure};
pub use secret::SigningSecret;
