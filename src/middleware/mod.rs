/*
 * Responsibility
 * - Router-level middleware (auth policy, CORS, HTTP plumbing)
 */
pub mod auth;
pub mod cors;
pub mod http;
