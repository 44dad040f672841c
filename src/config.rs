/*
 * Responsibility
 * - Load environment variables once at startup (.env supported)
 * - Validate them (missing/invalid values fail the boot)
 * - Derive the route table the proxy serves
 */
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use auth_token::SigningSecret;
use thiserror::Error;
use url::Url;

use crate::services::proxy::{AuthRequirement, PathRewrite, RoutePolicy};

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
    pub cors_allowed_origins: Vec<String>,

    pub jwt_secret: SigningSecret,

    pub auth_service_url: Url,
    pub spell_service_url: Url,
    // Protected routes are only mounted when a user service is configured.
    pub user_service_url: Option<Url>,

    pub upstream_timeout: Duration,
    pub request_timeout: Duration,
    pub max_body_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let jwt_secret = std::env::var("JWT_SECRET")
            .map_err(|_| ConfigError::Missing("JWT_SECRET"))
            .and_then(|s| SigningSecret::new(s).map_err(|_| ConfigError::Invalid("JWT_SECRET")))?;

        let auth_service_url = url_from_env("AUTH_SERVICE_URL", "http://auth-service:3001")?;
        let spell_service_url = url_from_env("SPELL_SERVICE_URL", "http://spell-service:3002")?;
        let user_service_url = match std::env::var("USER_SERVICE_URL") {
            Ok(raw) if !raw.trim().is_empty() => Some(parse_url(&raw, "USER_SERVICE_URL")?),
            _ => None,
        };

        let upstream_timeout =
            Duration::from_secs(positive_from_env("UPSTREAM_TIMEOUT_SECONDS", 15)?);
        let request_timeout =
            Duration::from_secs(positive_from_env("REQUEST_TIMEOUT_SECONDS", 30)?);
        let max_body_bytes = positive_from_env("MAX_BODY_BYTES", 10 * 1024 * 1024)?;

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins,
            jwt_secret,
            auth_service_url,
            spell_service_url,
            user_service_url,
            upstream_timeout,
            request_timeout,
            max_body_bytes,
        })
    }

    /// Routes served by the proxy, in no particular order.
    pub fn routes(&self) -> Vec<RoutePolicy> {
        let mut routes = vec![
            RoutePolicy::new(
                "/api/auth",
                self.auth_service_url.clone(),
                "Auth service",
            )
            .with_rewrite(PathRewrite::Preserve)
            .with_auth(AuthRequirement::None),
            RoutePolicy::new(
                "/api/spells",
                self.spell_service_url.clone(),
                "Spell service",
            )
            .with_rewrite(PathRewrite::Preserve)
            .with_auth(AuthRequirement::Optional),
        ];

        if let Some(url) = &self.user_service_url {
            routes.push(
                RoutePolicy::new("/api/profile", url.clone(), "User service")
                    .with_rewrite(PathRewrite::Preserve)
                    .with_auth(AuthRequirement::Required),
            );
        }

        routes
    }
}

fn url_from_env(key: &'static str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    parse_url(&raw, key)
}

fn positive_from_env<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + PartialEq + Default,
{
    parse_positive(std::env::var(key).ok().as_deref(), key, default)
}

// Unset falls back to `default`; zero or garbage fails the boot.
fn parse_positive<T>(raw: Option<&str>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + PartialEq + Default,
{
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(default);
    };

    match raw.parse::<T>() {
        Ok(value) if value != T::default() => Ok(value),
        _ => Err(ConfigError::Invalid(key)),
    }
}

fn parse_url(raw: &str, key: &'static str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|_| ConfigError::Invalid(key))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ConfigError::Invalid(key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(user_service_url: Option<&str>) -> Config {
        Config {
            addr: "127.0.0.1:3000".parse().unwrap(),
            app_env: AppEnv::Development,
            cors_allowed_origins: Vec::new(),
            jwt_secret: SigningSecret::new("s3cret").unwrap(),
            auth_service_url: Url::parse("http://auth-service:3001").unwrap(),
            spell_service_url: Url::parse("http://spell-service:3002").unwrap(),
            user_service_url: user_service_url.map(|u| Url::parse(u).unwrap()),
            upstream_timeout: Duration::from_secs(15),
            request_timeout: Duration::from_secs(30),
            max_body_bytes: 1024,
        }
    }

    #[test]
    fn default_routes_cover_auth_and_spells() {
        let routes = config(None).routes();
        let summary: Vec<_> = routes.iter().map(|r| (r.prefix(), r.auth())).collect();

        assert_eq!(
            summary,
            vec![
                ("/api/auth", AuthRequirement::None),
                ("/api/spells", AuthRequirement::Optional),
            ]
        );
    }

    #[test]
    fn user_service_mounts_a_protected_route() {
        let routes = config(Some("http://user-service:3003")).routes();
        let profile = routes.iter().find(|r| r.prefix() == "/api/profile").unwrap();

        assert_eq!(profile.auth(), AuthRequirement::Required);
        assert_eq!(profile.service(), "User service");
    }

    #[test]
    fn limits_must_be_positive() {
        assert_eq!(parse_positive::<u64>(None, "X", 15).unwrap(), 15);
        assert_eq!(parse_positive::<u64>(Some(" "), "X", 15).unwrap(), 15);
        assert_eq!(parse_positive::<u64>(Some("2"), "X", 15).unwrap(), 2);

        for raw in ["0", "-1", "fifteen"] {
            assert!(
                matches!(
                    parse_positive::<u64>(Some(raw), "UPSTREAM_TIMEOUT_SECONDS", 15),
                    Err(ConfigError::Invalid("UPSTREAM_TIMEOUT_SECONDS"))
                ),
                "{raw}"
            );
        }
        assert!(parse_positive::<usize>(Some("0"), "MAX_BODY_BYTES", 1024).is_err());
    }

    #[test]
    fn only_http_urls_are_accepted() {
        assert!(parse_url("http://spell-service:3002", "X").is_ok());
        assert!(parse_url("https://spells.example", "X").is_ok());
        assert!(matches!(
            parse_url("ftp://spells.example", "X"),
            Err(ConfigError::Invalid("X"))
        ));
        assert!(parse_url("not a url", "X").is_err());
    }
}
