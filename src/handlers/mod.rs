// src/handlers/mod.rs

pub mod account;
pub mod comment;
pub mod home;
pub mod post;

use axum::{Json, response::IntoResponse};
use serde_json::json;
use sqlx::SqlitePool;

use crate::{error::AppError, models::like::LikeTarget, services::likes, utils::jwt::Claims};

pub(crate) async fn likes_toggle(
    pool: &SqlitePool,
    claims: &Claims,
    target: LikeTarget,
    id: i64,
) -> Result<(), AppError> {
    likes::toggle_like(pool, target, id, claims.user_id()?).await?;
    Ok(())
}

/// Like endpoints answer `{ success }` and nothing else; clients re-read the
/// count. Failures keep their status and add an `error` string.
pub(crate) fn like_response(result: Result<(), AppError>) -> axum::response::Response {
    match result {
        Ok(()) => Json(json!({ "success": true })).into_response(),
        Err(err) => {
            if let AppError::InternalServerError(msg) = &err {
                tracing::error!("Like toggle failed: {}", msg);
            }
            (
                err.status(),
                Json(json!({ "success": false, "error": err.public_message() })),
            )
                .into_response()
        }
    }
}
