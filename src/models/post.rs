use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::{models::comment::CommentThread, utils::validation::not_blank};

/// Represents the 'posts' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub user_id: i64,
    pub title: String,

    /// Raw Markdown as written by the author.
    pub content: String,

    /// HTML derived from `content` on every save.
    pub rendered_content: String,

    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// A post row for the front page, with author and counters joined in.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PostSummary {
    pub id: i64,
    pub user_id: i64,
    pub author_display_name: String,
    pub title: String,
    pub content: String,
    pub rendered_content: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub likes_count: i64,
    pub comments_count: i64,
}

/// A single post with everything needed to show it: author, likes and the
/// two-tier comment tree.
#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub post: Post,
    pub author_display_name: String,
    pub likes_count: usize,
    /// Users who liked the post.
    pub liked_by: Vec<i64>,
    pub comments: Vec<CommentThread>,
}

/// DTO for creating or editing a post.
#[derive(Debug, Default, Clone, Deserialize, Serialize, Validate)]
pub struct PostForm {
    #[validate(
        custom(function = not_blank, message = "The Title field is required."),
        length(max = 200, message = "Title must be at most 200 characters.")
    )]
    #[serde(default)]
    pub title: String,

    #[validate(custom(function = not_blank, message = "The Content field is required."))]
    #[serde(default)]
    pub content: String,
}

/// What a cascade delete removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeleteSummary {
    pub comments_removed: u64,
    pub comment_likes_removed: u64,
    pub post_likes_removed: u64,
}
