/*
 * Responsibility
 * - Tracing / panic hook setup
 * - Config -> shared state -> Router assembly (auth policy, CORS, HTTP layers)
 * - axum::serve() startup
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use auth_token::TokenCodec;
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::middleware::{self, http::HttpLimits};
use crate::services::proxy::{RouteTable, Upstream};
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,api_gateway=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Surface panics through tracing so they are not lost with stderr.
        tracing::error!(?info, "panic");

        // Development: crash loudly. Production: default hook, keep serving.
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

    let state = build_state(&config)?;

    tracing::info!(
        "starting API gateway in {:?} mode on {}",
        config.app_env,
        config.addr
    );
    for route in state.routes.iter() {
        tracing::info!(
            prefix = route.prefix(),
            service = route.service(),
            auth = ?route.auth(),
            "route mounted"
        );
    }

    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Build process-level services once; everything in here is read-only.
pub fn build_state(config: &Config) -> Result<AppState> {
    let codec = Arc::new(TokenCodec::new(&config.jwt_secret));
    let routes = Arc::new(RouteTable::new(config.routes())?);
    let upstream = Upstream::new(config.upstream_timeout).context("failed to build HTTP client")?;

    Ok(AppState::new(codec, routes, upstream))
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    let router = api::routes(state);
    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router, HttpLimits::from(config))
}
