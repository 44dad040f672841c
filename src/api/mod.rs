/*
 * Responsibility
 * - Gateway HTTP surface: /health plus the proxied prefixes
 */
pub mod extractors;
pub mod handlers;
mod routes;

pub use routes::routes;
