// src/config.rs

use std::env;

use dotenvy::dotenv;

/// Format used for comment timestamps returned to the client.
pub const COMMENT_TIME_FORMAT: &str = "%b %d, %Y %H:%M";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    /// Session lifetime in seconds.
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub bind_addr: String,
    pub admin_email: String,
    pub admin_password: String,
    pub admin_display_name: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://blog.db?mode=rwc".to_string());

        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(86_400);

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let admin_email = env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@blog.com".to_string());
        let admin_password = env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "Admin123!".to_string());
        let admin_display_name =
            env::var("ADMIN_DISPLAY_NAME").unwrap_or_else(|_| "Blog Admin".to_string());

        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            bind_addr,
            admin_email,
            admin_password,
            admin_display_name,
        }
    }
}
