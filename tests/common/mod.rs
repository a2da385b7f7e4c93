// tests/common/mod.rs

#![allow(dead_code)]

use blog::{config::Config, db, models::like::LikeTarget, routes, services, state::AppState};
use std::path::PathBuf;

use chrono::Utc;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

pub const ADMIN_EMAIL: &str = "admin@blog.com";
pub const ADMIN_PASSWORD: &str = "Admin123!";

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600, // 10 minutes for tests
        rust_log: "error".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        admin_email: ADMIN_EMAIL.to_string(),
        admin_password: ADMIN_PASSWORD.to_string(),
        admin_display_name: "Blog Admin".to_string(),
    }
}

/// A private in-memory database with the schema applied.
///
/// One connection that never expires, because every new in-memory
/// connection would see an empty database.
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    pool
}

/// Pool with the master account and the sample post in place.
pub async fn seeded_pool() -> SqlitePool {
    let pool = test_pool().await;
    services::seed::run(&pool, &test_config())
        .await
        .expect("Seeding failed");
    pool
}

/// Inserts a user directly, skipping password hashing. Returns the id.
pub async fn insert_user(pool: &SqlitePool, email: &str, is_master: bool) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO users (email, display_name, password, is_master, created_at) \
         VALUES (?, ?, 'not-a-hash', ?, ?) RETURNING id",
    )
    .bind(email)
    .bind(email.split('@').next().unwrap())
    .bind(is_master)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn master_id(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT id FROM users WHERE email = ?")
        .bind(ADMIN_EMAIL)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn count(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Likes currently recorded on a post or comment.
pub async fn like_count(pool: &SqlitePool, target: LikeTarget, id: i64) -> i64 {
    let sql = match target {
        LikeTarget::Post => "SELECT COUNT(*) FROM post_likes WHERE post_id = ?",
        LikeTarget::Comment => "SELECT COUNT(*) FROM comment_likes WHERE comment_id = ?",
    };
    sqlx::query_scalar(sql).bind(id).fetch_one(pool).await.unwrap()
}

/// A seeded database in a temporary file, opened through the production
/// pool settings so several connections write at once.
pub struct FileDb {
    pub pool: SqlitePool,
    path: PathBuf,
}

impl FileDb {
    pub async fn new() -> Self {
        let path = std::env::temp_dir().join(format!("blog-test-{}.db", uuid::Uuid::new_v4()));
        let pool = db::connect(&format!("sqlite://{}", path.display()))
            .await
            .expect("Failed to open file database");
        services::seed::run(&pool, &test_config())
            .await
            .expect("Seeding failed");
        Self { pool, path }
    }
}

impl Drop for FileDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

/// Spawns the app on a random port. Returns the base URL and the pool
/// behind it so tests can inspect the store.
pub async fn spawn_app() -> (String, SqlitePool) {
    let pool = seeded_pool().await;

    let state = AppState {
        pool: pool.clone(),
        config: test_config(),
    };
    let app = routes::create_router(state);

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (address, pool)
}
