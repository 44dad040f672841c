//! Credential service: registers users and exchanges email/password pairs
//! for signed identity tokens the gateway verifies.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod repos;
pub mod services;
pub mod state;
