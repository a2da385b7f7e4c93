// src/services/comments.rs

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    db,
    config::COMMENT_TIME_FORMAT,
    error::AppError,
    models::comment::{Comment, CreateCommentRequest, CreatedComment},
    services::account::find_user,
};

/// Adds a comment, or a reply when `parent_comment_id` is set.
///
/// The parent must be a comment on the same post. Replying to a reply files
/// the new comment under the top-level comment of that thread, so replies
/// are never more than one level deep.
pub async fn add_comment(
    pool: &SqlitePool,
    author_id: i64,
    req: CreateCommentRequest,
) -> Result<CreatedComment, AppError> {
    req.validate()?;

    let mut tx = db::begin_write(pool).await?;

    let author = find_user(&mut tx, author_id)
        .await?
        .ok_or_else(|| AppError::AuthError("User not found".to_string()))?;

    let post_exists: Option<i64> = sqlx::query_scalar("SELECT id FROM posts WHERE id = ?")
        .bind(req.post_id)
        .fetch_optional(&mut *tx)
        .await?;
    if post_exists.is_none() {
        return Err(AppError::NotFound("Post not found.".to_string()));
    }

    let parent_comment_id = match req.parent_comment_id {
        None => None,
        Some(pid) => {
            let parent = sqlx::query_as::<_, Comment>(
                "SELECT id, post_id, user_id, parent_comment_id, content, created_at \
                 FROM comments WHERE id = ?",
            )
            .bind(pid)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::BadRequest("Parent comment not found".to_string()))?;

            if parent.post_id != req.post_id {
                tracing::warn!(
                    parent_id = pid,
                    post_id = req.post_id,
                    "Rejected reply to a comment on another post"
                );
                return Err(AppError::BadRequest(
                    "Parent comment does not belong to this post".to_string(),
                ));
            }

            Some(parent.parent_comment_id.unwrap_or(parent.id))
        }
    };

    let (id, created_at): (i64, DateTime<Utc>) = sqlx::query_as(
        r#"
        INSERT INTO comments (post_id, user_id, parent_comment_id, content, created_at)
        VALUES (?, ?, ?, ?, ?)
        RETURNING id, created_at
        "#,
    )
    .bind(req.post_id)
    .bind(author.id)
    .bind(parent_comment_id)
    .bind(&req.content)
    .bind(Utc::now())
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(comment_id = id, post_id = req.post_id, "Comment added");

    Ok(CreatedComment {
        id,
        content: req.content,
        username: author.display_name,
        created_at: created_at.format(COMMENT_TIME_FORMAT).to_string(),
        parent_comment_id,
    })
}
