// src/services/account.rs

use chrono::{Duration, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db,
    config::Config,
    error::{AppError, is_unique_violation},
    models::user::{LoginRequest, ProfileResponse, RegisterRequest, SessionResponse, User},
    utils::{
        hash::{check_password_policy, hash_password, verify_password},
        jwt::sign_jwt,
        redirect::local_or_home,
    },
};

const INVALID_LOGIN: &str = "Invalid email or password.";

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub(crate) async fn find_user(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, email, display_name, password, is_master, created_at FROM users WHERE id = ?",
    )
    .bind(user_id)
    .fetch_optional(conn)
    .await?;
    Ok(user)
}

pub(crate) async fn find_user_by_email(
    conn: &mut SqliteConnection,
    email: &str,
) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, email, display_name, password, is_master, created_at FROM users WHERE email = ?",
    )
    .bind(normalize_email(email))
    .fetch_optional(conn)
    .await?;
    Ok(user)
}

/// Loads the acting user, failing with an authentication error if the
/// session points at a user that no longer resolves.
pub(crate) async fn require_user(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<User, AppError> {
    find_user(conn, user_id)
        .await?
        .ok_or_else(|| AppError::AuthError("User not found. Please log in again.".to_string()))
}

/// Inserts a session row and signs a bearer token naming it. Expired
/// sessions are cleared out in the same transaction.
async fn open_session(
    conn: &mut SqliteConnection,
    config: &Config,
    user_id: i64,
) -> Result<String, AppError> {
    let session_id = Uuid::new_v4().to_string();
    let now = Utc::now();
    let expires_at = now + Duration::seconds(config.jwt_expiration as i64);

    let pruned = sqlx::query("DELETE FROM sessions WHERE expires_at < ?")
        .bind(now)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    if pruned > 0 {
        tracing::debug!(pruned, "Removed expired sessions");
    }

    sqlx::query("INSERT INTO sessions (id, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)")
        .bind(&session_id)
        .bind(user_id)
        .bind(now)
        .bind(expires_at)
        .execute(conn)
        .await?;

    sign_jwt(user_id, &session_id, &config.jwt_secret, config.jwt_expiration)
}

/// Creates a regular (non-master) account and signs it in.
pub async fn register(
    pool: &SqlitePool,
    config: &Config,
    req: RegisterRequest,
) -> Result<SessionResponse, AppError> {
    if req.email.trim().is_empty()
        || req.password.is_empty()
        || req.display_name.trim().is_empty()
    {
        return Err(AppError::BadRequest("All fields are required.".to_string()));
    }

    if req.password != req.confirm_password {
        return Err(AppError::BadRequest("Passwords do not match.".to_string()));
    }

    req.validate()?;

    let mut tx = db::begin_write(pool).await?;

    if find_user_by_email(&mut tx, &req.email).await?.is_some() {
        return Err(AppError::Conflict(
            "A user with this email already exists.".to_string(),
        ));
    }

    check_password_policy(&req.password).map_err(AppError::BadRequest)?;
    let hashed_password = hash_password(&req.password)?;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, display_name, password, is_master, created_at)
        VALUES (?, ?, ?, 0, ?)
        RETURNING id, email, display_name, password, is_master, created_at
        "#,
    )
    .bind(normalize_email(&req.email))
    .bind(req.display_name.trim())
    .bind(hashed_password)
    .bind(Utc::now())
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("A user with this email already exists.".to_string())
        } else {
            tracing::error!("Failed to register user: {:?}", e);
            AppError::from(e)
        }
    })?;

    let token = open_session(&mut tx, config, user.id).await?;
    tx.commit().await?;

    tracing::info!(user_id = user.id, "Registered new user");

    Ok(SessionResponse {
        token,
        token_type: "Bearer",
        user,
    })
}

/// Checks credentials and opens a session.
///
/// Returns the session and where to send the user next: the requested
/// `return_url` when it is local to this application, `/` otherwise.
pub async fn login(
    pool: &SqlitePool,
    config: &Config,
    req: LoginRequest,
) -> Result<(SessionResponse, String), AppError> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::BadRequest(
            "Email and password are required.".to_string(),
        ));
    }

    let mut tx = db::begin_write(pool).await?;

    let user = find_user_by_email(&mut tx, &req.email)
        .await?
        .ok_or_else(|| AppError::AuthError(INVALID_LOGIN.to_string()))?;

    if !verify_password(&req.password, &user.password)? {
        tracing::info!(user_id = user.id, "Rejected login with wrong password");
        return Err(AppError::AuthError(INVALID_LOGIN.to_string()));
    }

    let token = open_session(&mut tx, config, user.id).await?;
    tx.commit().await?;

    tracing::info!(user_id = user.id, "User logged in");

    let redirect = local_or_home(req.return_url.as_deref());
    Ok((
        SessionResponse {
            token,
            token_type: "Bearer",
            user,
        },
        redirect,
    ))
}

/// Ends a session. The token naming it stops working immediately.
pub async fn logout(pool: &SqlitePool, session_id: &str) -> Result<(), AppError> {
    sqlx::query("DELETE FROM sessions WHERE id = ?")
        .bind(session_id)
        .execute(pool)
        .await?;
    tracing::info!(session_id, "Session ended");
    Ok(())
}

/// True when the session exists and has not expired.
pub async fn session_is_live(pool: &SqlitePool, session_id: &str) -> Result<bool, AppError> {
    let expires_at: Option<chrono::DateTime<Utc>> =
        sqlx::query_scalar("SELECT expires_at FROM sessions WHERE id = ?")
            .bind(session_id)
            .fetch_optional(pool)
            .await?;

    Ok(expires_at.is_some_and(|at| at > Utc::now()))
}

pub async fn profile(pool: &SqlitePool, user_id: i64) -> Result<ProfileResponse, AppError> {
    let mut conn = pool.acquire().await?;
    let user = require_user(&mut conn, user_id).await?;

    let (comments_count, likes_given): (i64, i64) = sqlx::query_as(
        r#"
        SELECT
            (SELECT COUNT(*) FROM comments WHERE user_id = ?1),
            (SELECT COUNT(*) FROM post_likes WHERE user_id = ?1)
              + (SELECT COUNT(*) FROM comment_likes WHERE user_id = ?1)
        "#,
    )
    .bind(user_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(ProfileResponse {
        id: user.id,
        email: user.email,
        display_name: user.display_name,
        is_master: user.is_master,
        created_at: user.created_at,
        comments_count,
        likes_given,
    })
}
