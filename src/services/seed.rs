// src/services/seed.rs

use chrono::Utc;
use sqlx::SqlitePool;

use crate::{
    config::Config,
    db,
    error::AppError,
    services::account::find_user_by_email,
    utils::{
        hash::{check_password_policy, hash_password},
        markdown,
    },
};

const SAMPLE_TITLE: &str = "Welcome to My Personal Blog!";

const SAMPLE_CONTENT: &str = r#"# Welcome!

This is my first blog post written in **Markdown**.

## Features

This blog supports:
- Markdown rendering
- User comments and replies
- Like functionality

### Code Example

```rust
pub struct BlogPost {
    pub title: String,
    pub content: String,
}
```

> Feel free to explore and interact with the content!

Happy reading!
"#;

/// What a bootstrap run changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub master_created: bool,
    /// The admin email already belonged to a regular account.
    pub master_promoted: bool,
    pub sample_post_created: bool,
}

/// Prepares a fresh database: applies the schema, creates the master account
/// if it is missing (or promotes the account already holding the admin
/// email), and adds a sample post if there are no posts at all.
/// Running it again changes nothing.
pub async fn run(pool: &SqlitePool, config: &Config) -> Result<SeedReport, AppError> {
    db::migrate(pool).await?;

    let mut report = SeedReport::default();
    let mut tx = db::begin_write(pool).await?;

    let master_id = match find_user_by_email(&mut tx, &config.admin_email).await? {
        Some(user) => {
            if !user.is_master {
                sqlx::query("UPDATE users SET is_master = 1 WHERE id = ?")
                    .bind(user.id)
                    .execute(&mut *tx)
                    .await?;
                tracing::warn!(email = %user.email, "Promoted existing account to master user");
                report.master_promoted = true;
            }
            user.id
        }
        None => {
            check_password_policy(&config.admin_password).map_err(|msg| {
                AppError::InternalServerError(format!("Failed to create master user: {}", msg))
            })?;
            let hashed_password = hash_password(&config.admin_password)?;

            let id: i64 = sqlx::query_scalar(
                r#"
                INSERT INTO users (email, display_name, password, is_master, created_at)
                VALUES (?, ?, ?, 1, ?)
                RETURNING id
                "#,
            )
            .bind(config.admin_email.trim().to_lowercase())
            .bind(&config.admin_display_name)
            .bind(hashed_password)
            .bind(Utc::now())
            .fetch_one(&mut *tx)
            .await?;

            tracing::info!("Seeding master user: {}", config.admin_email);
            report.master_created = true;
            id
        }
    };

    let post_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
        .fetch_one(&mut *tx)
        .await?;

    if post_count == 0 {
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO posts (user_id, title, content, rendered_content, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(master_id)
        .bind(SAMPLE_TITLE)
        .bind(SAMPLE_CONTENT)
        .bind(markdown::render(SAMPLE_CONTENT))
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tracing::info!("Seeded sample post");
        report.sample_post_created = true;
    }

    tx.commit().await?;
    Ok(report)
}
