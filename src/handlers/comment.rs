// src/handlers/comment.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    handlers::{like_response, likes_toggle},
    models::{comment::CreateCommentRequest, like::LikeTarget},
    services::comments,
    utils::jwt::Claims,
};

/// Add a comment or reply.
///
/// Success returns `{ success, comment }` so the client can render it in
/// place. Failures return the status with a plain-text reason.
pub async fn add(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateCommentRequest>,
) -> Response {
    let result = match claims.user_id() {
        Ok(user_id) => comments::add_comment(&pool, user_id, payload).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(comment) => Json(json!({ "success": true, "comment": comment })).into_response(),
        Err(err) => {
            if let AppError::InternalServerError(msg) = &err {
                tracing::error!("Failed to add comment: {}", msg);
            }
            (err.status(), err.public_message()).into_response()
        }
    }
}

/// Toggle the current user's like on a comment.
pub async fn like(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    like_response(likes_toggle(&pool, &claims, LikeTarget::Comment, id).await)
}
