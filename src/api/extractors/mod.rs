/*
 * Responsibility
 * - Request-scoped values the auth policy middleware hands to the proxy handler
 */
pub mod identity;

pub use identity::{ForwardedIdentity, MatchedRoute, VerifiedIdentity};
