// src/handlers/post.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::{like::LikeTarget, post::PostForm},
    services::posts,
    utils::{flash::Flash, jwt::Claims},
};

/// Empty form for a new post. Doubles as the permission check for the
/// create page: non-master users get 403.
pub async fn create_form(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    posts::ensure_can_author(&pool, claims.user_id()?).await?;
    Ok(Json(PostForm::default()))
}

/// Create a new post.
/// Requires: Login + master user.
pub async fn create(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<PostForm>,
) -> Result<impl IntoResponse, AppError> {
    let post = posts::create_post(&pool, claims.user_id()?, payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "post": post,
            "flash": Flash::success("Post created successfully!"),
            "redirect": "/",
        })),
    ))
}

/// Current title and Markdown for the edit page.
pub async fn edit_form(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let form = posts::edit_form(&pool, id, claims.user_id()?).await?;
    Ok(Json(json!({ "postId": id, "form": form })))
}

/// Update a post.
/// Requires: Login + master user.
pub async fn edit(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(payload): Json<PostForm>,
) -> Result<impl IntoResponse, AppError> {
    let post = posts::edit_post(&pool, id, claims.user_id()?, payload).await?;

    Ok(Json(json!({
        "post": post,
        "flash": Flash::success("Post updated successfully!"),
        "redirect": format!("/post/{}", id),
    })))
}

/// Delete a post and all of its comments and likes.
/// Requires: Login + master user.
pub async fn delete(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let summary = posts::delete_post(&pool, id, claims.user_id()?).await?;

    Ok(Json(json!({
        "deleted": summary,
        "flash": Flash::success("Post deleted successfully!"),
        "redirect": "/",
    })))
}

/// Toggle the current user's like on a post.
pub async fn like(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    super::like_response(super::likes_toggle(&pool, &claims, LikeTarget::Post, id).await)
}
