use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use auth_token::TokenCodec;
use axum::{Router, routing::get};
use sqlx::postgres::PgPoolOptions;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::api::handlers::health::health;
use crate::config::{Config, ConfigError};
use crate::repos::user_repo::{MemoryUserRepo, PgUserRepo, UserRepo};
use crate::services::{credentials::CredentialService, password::PasswordService};
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,auth_service=debug,tower_http=debug cargo run -p auth-service
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    // Keep the default hook as a fallback (prints to stderr with location/payload).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting auth service in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let users = build_user_repo(&config).await?;
    let state = build_state(&config, users)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_user_repo(config: &Config) -> Result<Arc<dyn UserRepo>> {
    let Some(database_url) = &config.database_url else {
        tracing::warn!("DATABASE_URL not set; users are kept in memory and lost on restart");
        return Ok(Arc::new(MemoryUserRepo::new()));
    };

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .context("failed to connect to database")?;

    sqlx::migrate!()
        .run(&pool)
        .await
        .context("failed to run migrations")?;

    Ok(Arc::new(PgUserRepo::new(pool)))
}

/// Build process-level services and inject them into the shared state.
pub fn build_state(config: &Config, users: Arc<dyn UserRepo>) -> Result<AppState> {
    let codec = TokenCodec::new(&config.jwt_secret);
    let passwords = PasswordService::new(config.password_memory_kib, config.password_iterations)
        .map_err(|_| ConfigError::Invalid("PASSWORD_HASH_MEMORY_KIB"))?;

    let credentials = CredentialService::new(users, passwords, codec, config.token_ttl);

    Ok(AppState::new(Arc::new(credentials)))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/auth", api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
