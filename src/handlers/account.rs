// src/handlers/account.rs

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    config::Config,
    error::AppError,
    models::user::{LoginRequest, RegisterRequest},
    services::account,
    utils::{flash::Flash, jwt::Claims},
};

/// Registers a new (non-master) user and signs them in.
///
/// Returns 201 Created with a bearer token for the new session.
pub async fn register(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let session = account::register(&pool, &config, payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "token": session.token,
            "type": session.token_type,
            "user": session.user,
            "flash": Flash::success("Registration successful!"),
            "redirect": "/",
        })),
    ))
}

/// Authenticates a user and returns a bearer token.
///
/// `redirect` echoes `returnUrl` only when it stays inside this application.
pub async fn login(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (session, redirect) = account::login(&pool, &config, payload).await?;

    Ok(Json(json!({
        "token": session.token,
        "type": session.token_type,
        "user": session.user,
        "flash": Flash::success("Login successful!"),
        "redirect": redirect,
    })))
}

/// Ends the current session.
pub async fn logout(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    account::logout(&pool, &claims.sid).await?;

    Ok(Json(json!({
        "flash": Flash::success("You have been logged out."),
        "redirect": "/",
    })))
}

/// Current user's profile.
pub async fn profile(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let profile = account::profile(&pool, claims.user_id()?).await?;
    Ok(Json(profile))
}
