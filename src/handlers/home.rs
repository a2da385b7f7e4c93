// src/handlers/home.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use sqlx::SqlitePool;

use crate::{error::AppError, services::posts};

/// Front page: every post, newest first.
pub async fn index(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let posts = posts::list_posts(&pool).await?;
    Ok(Json(posts))
}

/// A single post with its comments and replies.
/// A missing post answers 404 with a flash message and a redirect to `/`.
pub async fn show_post(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let post = posts::get_post(&pool, id).await?;
    Ok(Json(post))
}
