use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use auth_token::SigningSecret;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    // Shared with the gateway, which verifies what we sign.
    pub jwt_secret: SigningSecret,
    // No database configured: users live in memory for the process lifetime.
    pub database_url: Option<String>,
    pub token_ttl: Duration,
    // Argon2id cost for new password hashes.
    pub password_memory_kib: u32,
    pub password_iterations: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3001);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let jwt_secret = std::env::var("JWT_SECRET")
            .map_err(|_| ConfigError::Missing("JWT_SECRET"))
            .and_then(|s| SigningSecret::new(s).map_err(|_| ConfigError::Invalid("JWT_SECRET")))?;

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());

        if database_url.is_none() && app_env.is_production() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let token_ttl = Duration::from_secs(
            std::env::var("TOKEN_TTL_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(86_400), // 24h
        );

        let password_memory_kib = std::env::var("PASSWORD_HASH_MEMORY_KIB")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(19_456);
        let password_iterations = std::env::var("PASSWORD_HASH_ITERATIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(2);

        Ok(Config {
            addr,
            app_env,
            jwt_secret,
            database_url,
            token_ttl,
            password_memory_kib,
            password_iterations,
        })
    }
}
