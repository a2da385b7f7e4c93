use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::utils::validation::not_blank;

/// Represents the 'comments' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64,
    /// Set for replies; always points at a top-level comment.
    pub parent_comment_id: Option<i64>,
    pub content: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for creating a new comment or reply.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub post_id: i64,

    #[validate(custom(function = not_blank, message = "Comment content is required"))]
    #[serde(default)]
    pub content: String,

    /// Optional: the ID of the comment being replied to.
    pub parent_comment_id: Option<i64>,
}

/// The payload a client needs to show a fresh comment without reloading.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedComment {
    pub id: i64,
    pub content: String,
    pub username: String,
    pub created_at: String,
    pub parent_comment_id: Option<i64>,
}

/// A comment joined with its author and like count.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CommentView {
    pub id: i64,
    pub user_id: i64,
    pub author_display_name: String,
    pub parent_comment_id: Option<i64>,
    pub content: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub likes_count: i64,
    /// Users who liked the comment.
    #[sqlx(skip)]
    pub liked_by: Vec<i64>,
}

/// A top-level comment and its replies, oldest first.
#[derive(Debug, Clone, Serialize)]
pub struct CommentThread {
    #[serde(flatten)]
    pub comment: CommentView,
    pub replies: Vec<CommentView>,
}
