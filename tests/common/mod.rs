#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use api_gateway::app;
use api_gateway::config::{AppEnv, Config};
use auth_token::{Identity, SigningSecret, TokenCodec};
use axum::{
    Json, Router,
    body::{Body, Bytes},
    extract::{Request, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use http_body_util::BodyExt;
use serde_json::{Map, Value, json};
use tokio::net::TcpListener;
use url::Url;

pub const SECRET: &str = "test-signing-secret";

pub fn codec() -> TokenCodec {
    TokenCodec::new(&SigningSecret::new(SECRET).unwrap())
}

pub fn token_for(identity: &Identity) -> String {
    codec().issue(identity, Duration::from_secs(300)).unwrap()
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

pub fn config(auth: Url, spells: Url, users: Option<Url>) -> Config {
    Config {
        addr: "127.0.0.1:0".parse().unwrap(),
        app_env: AppEnv::Development,
        cors_allowed_origins: Vec::new(),
        jwt_secret: SigningSecret::new(SECRET).unwrap(),
        auth_service_url: auth,
        spell_service_url: spells,
        user_service_url: users,
        upstream_timeout: Duration::from_secs(2),
        request_timeout: Duration::from_secs(5),
        max_body_bytes: 64 * 1024,
    }
}

pub fn gateway(config: &Config) -> Router {
    let state = app::build_state(config).unwrap();
    app::build_router(state, config)
}

pub async fn json_body(res: Response) -> Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// A backend that answers every request with a JSON description of what it
/// received. `GET .../missing` answers 404 instead.
pub struct EchoBackend {
    pub url: Url,
    hits: Arc<AtomicUsize>,
}

impl EchoBackend {
    pub async fn spawn() -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let app = Router::new().fallback(echo).with_state(hits.clone());
        let addr = serve(app).await;

        Self {
            url: Url::parse(&format!("http://{addr}")).unwrap(),
            hits,
        }
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

async fn echo(State(hits): State<Arc<AtomicUsize>>, req: Request) -> Response {
    hits.fetch_add(1, Ordering::SeqCst);

    let (parts, body) = req.into_parts();
    if parts.uri.path().ends_with("/missing") {
        return (
            StatusCode::NOT_FOUND,
            [("x-backend", "echo")],
            Json(json!({ "message": "No such spell" })),
        )
            .into_response();
    }

    let body: Bytes = body.collect().await.unwrap().to_bytes();
    let headers: Map<String, Value> = parts
        .headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                Value::String(value.to_str().unwrap_or_default().to_string()),
            )
        })
        .collect();

    Json(json!({
        "method": parts.method.as_str(),
        "path": parts.uri.path(),
        "query": parts.uri.query(),
        "headers": headers,
        "body": String::from_utf8_lossy(&body),
    }))
    .into_response()
}

pub async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// An address nothing listens on: bind an ephemeral port, then release it.
pub async fn unreachable_url() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Url::parse(&format!("http://{addr}")).unwrap()
}

/// A backend that accepts connections and closes them without answering.
pub struct ClosingBackend {
    pub url: Url,
    accepted: Arc<AtomicUsize>,
}

impl ClosingBackend {
    pub async fn spawn() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let accepted = Arc::new(AtomicUsize::new(0));

        let counter = accepted.clone();
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                drop(socket);
            }
        });

        Self {
            url: Url::parse(&format!("http://{addr}")).unwrap(),
            accepted,
        }
    }

    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }
}

/// A backend that accepts connections and never answers on them.
pub struct HangingBackend {
    pub url: Url,
}

impl HangingBackend {
    pub async fn spawn() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        Self {
            url: Url::parse(&format!("http://{addr}")).unwrap(),
        }
    }
}

pub fn get(uri: &str) -> axum::http::request::Builder {
    axum::http::Request::builder().method("GET").uri(uri)
}

pub fn empty() -> Body {
    Body::empty()
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request {
    axum::http::Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
