// src/services/posts.rs

use std::collections::HashMap;

use chrono::Utc;
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use validator::Validate;

use crate::{
    db,
    error::AppError,
    models::{
        comment::{CommentThread, CommentView},
        post::{DeleteSummary, Post, PostDetail, PostForm, PostSummary},
        user::User,
    },
    services::account::require_user,
    utils::markdown,
};

const POST_COLUMNS: &str =
    "id, user_id, title, content, rendered_content, created_at, updated_at";

/// Loads the acting user and checks the master capability.
async fn require_master(
    conn: &mut SqliteConnection,
    user_id: i64,
    action: &str,
) -> Result<User, AppError> {
    let user = require_user(conn, user_id).await?;
    if !user.is_master {
        tracing::warn!(user_id, action, "Non-master user tried to change a post");
        return Err(AppError::Forbidden(format!(
            "You don't have permission to {} posts.",
            action
        )));
    }
    Ok(user)
}

async fn find_post(conn: &mut SqliteConnection, id: i64) -> Result<Option<Post>, AppError> {
    let post = sqlx::query_as::<_, Post>(&format!("SELECT {} FROM posts WHERE id = ?", POST_COLUMNS))
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(post)
}

fn post_not_found() -> AppError {
    AppError::NotFound("Post not found.".to_string())
}

/// Permission probe for the create page.
pub async fn ensure_can_author(pool: &SqlitePool, user_id: i64) -> Result<(), AppError> {
    let mut conn = pool.acquire().await?;
    require_master(&mut conn, user_id, "create").await?;
    Ok(())
}

/// Publishes a new post. Only the master user may do this.
pub async fn create_post(
    pool: &SqlitePool,
    author_id: i64,
    form: PostForm,
) -> Result<Post, AppError> {
    let mut tx = db::begin_write(pool).await?;
    let author = require_master(&mut tx, author_id, "create").await?;

    form.validate()?;

    let now = Utc::now();
    let post = sqlx::query_as::<_, Post>(&format!(
        r#"
        INSERT INTO posts (user_id, title, content, rendered_content, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING {}
        "#,
        POST_COLUMNS
    ))
    .bind(author.id)
    .bind(&form.title)
    .bind(&form.content)
    .bind(markdown::render(&form.content))
    .bind(now)
    .bind(now)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create post: {:?}", e);
        AppError::from(e)
    })?;

    tx.commit().await?;

    tracing::info!(post_id = post.id, "Post created");
    Ok(post)
}

/// Returns the current title and Markdown source for the edit form.
pub async fn edit_form(pool: &SqlitePool, id: i64, editor_id: i64) -> Result<PostForm, AppError> {
    let mut conn = pool.acquire().await?;
    require_master(&mut conn, editor_id, "edit").await?;

    let post = find_post(&mut conn, id).await?.ok_or_else(post_not_found)?;
    Ok(PostForm {
        title: post.title,
        content: post.content,
    })
}

/// Rewrites a post's title and content. The HTML is re-rendered on every
/// edit and `created_at` never changes.
pub async fn edit_post(
    pool: &SqlitePool,
    id: i64,
    editor_id: i64,
    form: PostForm,
) -> Result<Post, AppError> {
    let mut tx = db::begin_write(pool).await?;
    require_master(&mut tx, editor_id, "edit").await?;

    if find_post(&mut tx, id).await?.is_none() {
        return Err(post_not_found());
    }

    form.validate()?;

    let post = sqlx::query_as::<_, Post>(&format!(
        r#"
        UPDATE posts
        SET title = ?, content = ?, rendered_content = ?, updated_at = ?
        WHERE id = ?
        RETURNING {}
        "#,
        POST_COLUMNS
    ))
    .bind(&form.title)
    .bind(&form.content)
    .bind(markdown::render(&form.content))
    .bind(Utc::now())
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(post_id = id, "Post updated");
    Ok(post)
}

/// Deletes a post together with everything hanging off it.
///
/// Rows go in dependency order: comment likes, replies, top-level comments,
/// post likes, then the post. Either all of it commits or none of it does.
pub async fn delete_post(
    pool: &SqlitePool,
    id: i64,
    requester_id: i64,
) -> Result<DeleteSummary, AppError> {
    let mut tx = db::begin_write(pool).await?;
    require_master(&mut tx, requester_id, "delete").await?;

    if find_post(&mut tx, id).await?.is_none() {
        return Err(post_not_found());
    }

    // Replies are matched by post and by parent so that a reply filed under
    // another post id cannot be left pointing at a deleted comment.
    let comment_likes_removed = sqlx::query(
        r#"
        DELETE FROM comment_likes
        WHERE comment_id IN (
            SELECT id FROM comments
            WHERE post_id = ?1
               OR parent_comment_id IN (SELECT id FROM comments WHERE post_id = ?1)
        )
        "#,
    )
    .bind(id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    let replies_removed = sqlx::query(
        r#"
        DELETE FROM comments
        WHERE parent_comment_id IS NOT NULL
          AND (post_id = ?1
               OR parent_comment_id IN (SELECT id FROM comments WHERE post_id = ?1))
        "#,
    )
    .bind(id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    let top_level_removed = sqlx::query("DELETE FROM comments WHERE post_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let post_likes_removed = sqlx::query("DELETE FROM post_likes WHERE post_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    sqlx::query("DELETE FROM posts WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await.map_err(|e| {
        tracing::error!("Failed to delete post {}: {:?}", id, e);
        AppError::from(e)
    })?;

    let summary = DeleteSummary {
        comments_removed: replies_removed + top_level_removed,
        comment_likes_removed,
        post_likes_removed,
    };
    tracing::info!(post_id = id, ?summary, "Post deleted");
    Ok(summary)
}

/// All posts, newest first, with author and counters in the same query.
pub async fn list_posts(pool: &SqlitePool) -> Result<Vec<PostSummary>, AppError> {
    let posts = sqlx::query_as::<_, PostSummary>(
        r#"
        SELECT
            p.id, p.user_id, u.display_name AS author_display_name,
            p.title, p.content, p.rendered_content,
            p.created_at, p.updated_at,
            (SELECT COUNT(*) FROM post_likes pl WHERE pl.post_id = p.id) AS likes_count,
            (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comments_count
        FROM posts p
        JOIN users u ON u.id = p.user_id
        ORDER BY p.created_at DESC, p.id DESC
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list posts: {:?}", e);
        AppError::from(e)
    })?;

    tracing::debug!("Found {} posts", posts.len());
    Ok(posts)
}

#[derive(FromRow)]
struct PostWithAuthor {
    #[sqlx(flatten)]
    post: Post,
    author_display_name: String,
}

/// One post with its author, likes and full comment tree, read from a
/// single snapshot.
pub async fn get_post(pool: &SqlitePool, id: i64) -> Result<PostDetail, AppError> {
    let mut tx = pool.begin().await?;

    let row = sqlx::query_as::<_, PostWithAuthor>(
        r#"
        SELECT
            p.id, p.user_id, p.title, p.content, p.rendered_content,
            p.created_at, p.updated_at,
            u.display_name AS author_display_name
        FROM posts p
        JOIN users u ON u.id = p.user_id
        WHERE p.id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| {
        tracing::warn!(post_id = id, "Post not found");
        AppError::NotFound(format!("Post with ID {} not found", id))
    })?;

    let liked_by: Vec<i64> =
        sqlx::query_scalar("SELECT user_id FROM post_likes WHERE post_id = ? ORDER BY id")
            .bind(id)
            .fetch_all(&mut *tx)
            .await?;

    let comments = sqlx::query_as::<_, CommentView>(
        r#"
        SELECT
            c.id, c.user_id, u.display_name AS author_display_name,
            c.parent_comment_id, c.content, c.created_at,
            (SELECT COUNT(*) FROM comment_likes cl WHERE cl.comment_id = c.id) AS likes_count
        FROM comments c
        JOIN users u ON u.id = c.user_id
        WHERE c.post_id = ?
        ORDER BY c.created_at, c.id
        "#,
    )
    .bind(id)
    .fetch_all(&mut *tx)
    .await?;

    let comment_likes: Vec<(i64, i64)> = sqlx::query_as(
        r#"
        SELECT cl.comment_id, cl.user_id
        FROM comment_likes cl
        JOIN comments c ON c.id = cl.comment_id
        WHERE c.post_id = ?
        ORDER BY cl.id
        "#,
    )
    .bind(id)
    .fetch_all(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(PostDetail {
        post: row.post,
        author_display_name: row.author_display_name,
        likes_count: liked_by.len(),
        liked_by,
        comments: build_threads(comments, &comment_likes),
    })
}

/// Groups a post's comments into top-level threads with their replies.
///
/// Input must be in display order. A reply to a reply is shown under the
/// top-level comment of its thread; a comment whose parent is missing is
/// shown as top-level.
pub fn build_threads(comments: Vec<CommentView>, likes: &[(i64, i64)]) -> Vec<CommentThread> {
    let mut liked_by: HashMap<i64, Vec<i64>> = HashMap::new();
    for (comment_id, user_id) in likes {
        liked_by.entry(*comment_id).or_default().push(*user_id);
    }

    let parents: HashMap<i64, Option<i64>> = comments
        .iter()
        .map(|c| (c.id, c.parent_comment_id))
        .collect();

    let root_of = |mut id: i64| {
        // Bounded by the number of comments, so a cycle cannot hang us.
        for _ in 0..parents.len() {
            match parents.get(&id) {
                Some(Some(parent)) if parents.contains_key(parent) => id = *parent,
                _ => break,
            }
        }
        id
    };

    let mut threads: Vec<CommentThread> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();
    let mut replies: Vec<(i64, CommentView)> = Vec::new();

    for mut comment in comments {
        comment.liked_by = liked_by.remove(&comment.id).unwrap_or_default();
        let root = root_of(comment.id);
        if root == comment.id {
            index.insert(comment.id, threads.len());
            threads.push(CommentThread {
                comment,
                replies: Vec::new(),
            });
        } else {
            replies.push((root, comment));
        }
    }

    for (root, reply) in replies {
        if let Some(&i) = index.get(&root) {
            threads[i].replies.push(reply);
        }
    }

    threads
}
