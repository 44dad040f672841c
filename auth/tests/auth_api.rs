use std::sync::Arc;
use std::time::Duration;

use auth_service::app::{build_router, build_state};
use auth_service::config::{AppEnv, Config};
use auth_service::repos::user_repo::MemoryUserRepo;
use auth_token::{SigningSecret, TokenCodec};
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

const SECRET: &str = "auth-api-test-secret";

fn app() -> Router {
    let config = Config {
        addr: "127.0.0.1:0".parse().unwrap(),
        app_env: AppEnv::Development,
        jwt_secret: SigningSecret::new(SECRET).unwrap(),
        database_url: None,
        token_ttl: Duration::from_secs(600),
        password_memory_kib: 8,
        password_iterations: 1,
    };
    build_router(build_state(&config, Arc::new(MemoryUserRepo::new())).unwrap())
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(res: Response) -> Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn merlin() -> Value {
    json!({ "username": "merlin", "email": "merlin@camelot.uk", "password": "abracadabra" })
}

#[tokio::test]
async fn health_reports_the_service() {
    let res = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        json_body(res).await,
        json!({ "status": "ok", "service": "auth-service" })
    );
}

#[tokio::test]
async fn register_then_login_issues_a_verifiable_token() {
    let app = app();

    let res = app
        .clone()
        .oneshot(post("/api/auth/register", merlin()))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let user_id = json_body(res).await["userId"].as_str().unwrap().to_string();

    let res = app
        .oneshot(post(
            "/api/auth/login",
            json!({ "email": "merlin@camelot.uk", "password": "abracadabra" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = json_body(res).await;
    assert_eq!(body["userId"], user_id.as_str());

    let codec = TokenCodec::new(&SigningSecret::new(SECRET).unwrap());
    let claims = codec.verify(body["token"].as_str().unwrap()).unwrap();
    assert_eq!(claims.user_id.to_string(), user_id);
    assert_eq!(claims.username, "merlin");
    assert_eq!(claims.role_or_default(), "user");
    assert_eq!(claims.exp - claims.iat, 600);
}

#[tokio::test]
async fn duplicate_username_conflicts() {
    let app = app();

    let res = app
        .clone()
        .oneshot(post("/api/auth/register", merlin()))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = app
        .oneshot(post(
            "/api/auth/register",
            json!({ "username": "merlin", "email": "other@camelot.uk", "password": "abracadabra" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(json_body(res).await, json!({ "message": "User already exists" }));
}

#[tokio::test]
async fn invalid_registration_lists_field_errors() {
    let res = app()
        .oneshot(post("/api/auth/register", json!({ "username": "ab", "email": "nope" })))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = json_body(res).await;
    let fields: Vec<_> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(fields, ["username", "email", "password"]);
}

#[tokio::test]
async fn unknown_email_and_wrong_password_look_the_same() {
    let app = app();
    app.clone()
        .oneshot(post("/api/auth/register", merlin()))
        .await
        .unwrap();

    for attempt in [
        json!({ "email": "merlin@camelot.uk", "password": "wrong-password" }),
        json!({ "email": "arthur@camelot.uk", "password": "abracadabra" }),
    ] {
        let res = app.clone().oneshot(post("/api/auth/login", attempt)).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            json_body(res).await,
            json!({ "message": "Invalid email or password" })
        );
    }
}

#[tokio::test]
async fn malformed_bodies_keep_the_json_envelope() {
    let wrong_type = post(
        "/api/auth/register",
        json!({ "username": 5, "email": "merlin@camelot.uk", "password": "abracadabra" }),
    );
    let not_json = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"email\":"))
        .unwrap();
    let no_content_type = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .body(Body::from(json!({ "email": "a@b.c", "password": "secret" }).to_string()))
        .unwrap();

    let app = app();
    for req in [wrong_type, not_json, no_content_type] {
        let res = app.clone().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = json_body(res).await;
        assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()), "{body}");
    }
}
