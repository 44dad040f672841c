use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;

use crate::api::dto::login::{LoginRequest, LoginResponse};
use crate::api::dto::register::{RegisterRequest, RegisterResponse, normalize_email};
use crate::api::extractors::extract_json;
use crate::error::AppError;
use crate::state::AppState;

pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let user = extract_json(body)?
        .validate()
        .map_err(AppError::Validation)?;

    let user_id = state.credentials.register(user).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User created",
            user_id,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let req = extract_json(body)?;
    let email = normalize_email(&req.email);

    let out = state.credentials.login(&email, &req.password).await?;

    Ok(Json(LoginResponse {
        token: out.token,
        user_id: out.user_id,
        username: out.username,
    }))
}
