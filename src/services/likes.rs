// src/services/likes.rs

use chrono::Utc;
use sqlx::SqlitePool;

use crate::{
    db,
    error::AppError,
    models::like::{LikeState, LikeTarget},
    services::account::require_user,
};

/// Flips the like state of `(user, target)`: an existing like is removed,
/// a missing one is added.
///
/// The UNIQUE (user_id, target) constraint backs the at-most-one-like rule.
/// If a concurrent toggle inserts first, our insert is a no-op and the pair
/// still ends up with exactly one row.
pub async fn toggle_like(
    pool: &SqlitePool,
    target: LikeTarget,
    target_id: i64,
    user_id: i64,
) -> Result<LikeState, AppError> {
    let mut tx = db::begin_write(pool).await?;

    require_user(&mut tx, user_id).await?;

    let exists: Option<i64> = sqlx::query_scalar(&format!(
        "SELECT id FROM {} WHERE id = ?",
        target.parent_table()
    ))
    .bind(target_id)
    .fetch_optional(&mut *tx)
    .await?;
    if exists.is_none() {
        return Err(AppError::NotFound(format!("{} not found.", target.label())));
    }

    let removed = sqlx::query(&format!(
        "DELETE FROM {} WHERE user_id = ? AND {} = ?",
        target.table(),
        target.column()
    ))
    .bind(user_id)
    .bind(target_id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    let state = if removed > 0 {
        LikeState::Unliked
    } else {
        sqlx::query(&format!(
            "INSERT INTO {table} (user_id, {col}, created_at) VALUES (?, ?, ?) \
             ON CONFLICT (user_id, {col}) DO NOTHING",
            table = target.table(),
            col = target.column()
        ))
        .bind(user_id)
        .bind(target_id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;
        LikeState::Liked
    };

    tx.commit().await?;

    tracing::info!(?target, target_id, user_id, ?state, "Like toggled");
    Ok(state)
}
