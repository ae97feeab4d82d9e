// src/handlers/auth.rs

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::{
    config::Config,
    error::AppError,
    models::user::{CreateUserRequest, LoginRequest},
    services::AccountService,
    utils::{
        extract::ValidatedJson,
        jwt::{Claims, sign_jwt},
    },
};

/// Registers a new user.
///
/// Returns 201 Created and the user object (excluding password).
pub async fn register(
    State(accounts): State<AccountService>,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = accounts
        .register(&payload.username, &payload.password)
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Authenticates a user and returns a JWT bearer token.
pub async fn login(
    State(accounts): State<AccountService>,
    State(config): State<Config>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = accounts
        .authenticate(&payload.username, &payload.password)
        .await?;

    let token = sign_jwt(
        user.id,
        &user.username,
        &config.jwt_secret,
        config.jwt_expiration,
    )?;

    Ok(Json(json!({
        "token": token,
        "type": "Bearer",
        "user": user,
    })))
}

/// Returns the user behind the bearer token.
pub async fn current_user(
    State(accounts): State<AccountService>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user = accounts.get_user(claims.user_id()?).await?;
    Ok(Json(user))
}
