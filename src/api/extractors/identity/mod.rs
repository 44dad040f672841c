/*!
 * Forwarded identity
 *
 * Responsibility:
 * - Carry the verified identity (if any) and the matched route from the auth
 *   policy middleware to the proxy handler via request extensions
 * - Keep the header mapping in one place (types) and axum glue in core
 */

mod core;
mod types;

pub use core::{MatchedRoute, VerifiedIdentity};
pub use types::ForwardedIdentity;
