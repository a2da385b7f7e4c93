// src/models/user.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    /// Unique login email.
    pub email: String,

    pub display_name: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,

    /// The blog author. Only this user may create, edit or delete posts.
    pub is_master: bool,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Profile data for the current user.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: i64,
    pub email: String,
    pub display_name: String,
    pub is_master: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub comments_count: i64,
    pub likes_given: i64,
}

/// DTO for creating a new user (Registration).
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(email(message = "Email must be a valid address."))]
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    #[validate(length(max = 50, message = "Display name must be at most 50 characters."))]
    #[serde(default)]
    pub display_name: String,
}

/// DTO for user login.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    /// Page to go back to after a successful login.
    pub return_url: Option<String>,
}

/// Result of a successful login or registration.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: String,
    #[serde(rename = "type")]
    pub token_type: &'static str,
    pub user: User,
}
