//! Edge gateway: per-route bearer-token policy in front of a reverse proxy.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;
