// tests/account_service_tests.rs

mod common;

use blog::{
    error::AppError,
    models::user::{LoginRequest, RegisterRequest},
    services::account,
    utils::jwt::verify_jwt,
};
use common::{ADMIN_EMAIL, ADMIN_PASSWORD, seeded_pool, test_config};

fn registration(email: &str, password: &str, confirm: &str, name: &str) -> RegisterRequest {
    RegisterRequest {
        email: email.to_string(),
        password: password.to_string(),
        confirm_password: confirm.to_string(),
        display_name: name.to_string(),
    }
}

fn credentials(email: &str, password: &str, return_url: Option<&str>) -> LoginRequest {
    LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
        return_url: return_url.map(str::to_string),
    }
}

#[tokio::test]
async fn register_creates_regular_user_with_live_session() {
    let pool = seeded_pool().await;
    let config = test_config();

    let session = account::register(
        &pool,
        &config,
        registration("bob@x.com", "Passw0rd!", "Passw0rd!", "Bob"),
    )
    .await
    .unwrap();

    assert_eq!(session.user.email, "bob@x.com");
    assert_eq!(session.user.display_name, "Bob");
    assert!(!session.user.is_master);

    let claims = verify_jwt(&session.token, &config.jwt_secret).unwrap();
    assert_eq!(claims.user_id().unwrap(), session.user.id);
    assert!(account::session_is_live(&pool, &claims.sid).await.unwrap());
}

#[tokio::test]
async fn register_rejects_missing_fields_and_mismatch() {
    let pool = seeded_pool().await;
    let config = test_config();

    match account::register(&pool, &config, registration("", "Passw0rd!", "Passw0rd!", "B")).await {
        Err(AppError::BadRequest(msg)) => assert_eq!(msg, "All fields are required."),
        other => panic!("unexpected {:?}", other.map(|s| s.user)),
    }
    match account::register(&pool, &config, registration("b@x.com", "Passw0rd!", "Passw0rd?", "B")).await {
        Err(AppError::BadRequest(msg)) => assert_eq!(msg, "Passwords do not match."),
        other => panic!("unexpected {:?}", other.map(|s| s.user)),
    }
    assert!(matches!(
        account::register(&pool, &config, registration("not-an-email", "Passw0rd!", "Passw0rd!", "B")).await,
        Err(AppError::BadRequest(_))
    ));
}

#[tokio::test]
async fn register_surfaces_first_password_rule() {
    let pool = seeded_pool().await;
    let config = test_config();

    match account::register(&pool, &config, registration("b@x.com", "abc", "abc", "B")).await {
        Err(AppError::BadRequest(msg)) => {
            assert_eq!(msg, "Passwords must be at least 6 characters.")
        }
        other => panic!("unexpected {:?}", other.map(|s| s.user)),
    }
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let pool = seeded_pool().await;
    let config = test_config();

    account::register(&pool, &config, registration("bob@x.com", "Passw0rd!", "Passw0rd!", "Bob"))
        .await
        .unwrap();

    assert!(matches!(
        account::register(&pool, &config, registration("BOB@x.com", "Passw0rd!", "Passw0rd!", "Bob 2")).await,
        Err(AppError::Conflict(_))
    ));
    assert!(matches!(
        account::register(&pool, &config, registration(ADMIN_EMAIL, "Passw0rd!", "Passw0rd!", "Admin")).await,
        Err(AppError::Conflict(_))
    ));
}

#[tokio::test]
async fn login_failures_share_one_message() {
    let pool = seeded_pool().await;
    let config = test_config();

    let wrong_password = account::login(&pool, &config, credentials(ADMIN_EMAIL, "nope", None)).await;
    let unknown_user = account::login(&pool, &config, credentials("ghost@x.com", "nope", None)).await;

    for result in [wrong_password, unknown_user] {
        match result {
            Err(AppError::AuthError(msg)) => assert_eq!(msg, "Invalid email or password."),
            other => panic!("unexpected {:?}", other.map(|(s, _)| s.user)),
        }
    }

    assert!(matches!(
        account::login(&pool, &config, credentials("", "", None)).await,
        Err(AppError::BadRequest(_))
    ));
}

#[tokio::test]
async fn login_only_follows_local_return_urls() {
    let pool = seeded_pool().await;
    let config = test_config();

    let (session, redirect) = account::login(
        &pool,
        &config,
        credentials(ADMIN_EMAIL, ADMIN_PASSWORD, Some("/post/1")),
    )
    .await
    .unwrap();
    assert!(session.user.is_master);
    assert_eq!(redirect, "/post/1");

    let (_, redirect) = account::login(
        &pool,
        &config,
        credentials(ADMIN_EMAIL, ADMIN_PASSWORD, Some("https://evil.example/phish")),
    )
    .await
    .unwrap();
    assert_eq!(redirect, "/");
}

#[tokio::test]
async fn logout_ends_the_session() {
    let pool = seeded_pool().await;
    let config = test_config();

    let (session, _) = account::login(&pool, &config, credentials(ADMIN_EMAIL, ADMIN_PASSWORD, None))
        .await
        .unwrap();
    let claims = verify_jwt(&session.token, &config.jwt_secret).unwrap();

    assert!(account::session_is_live(&pool, &claims.sid).await.unwrap());
    account::logout(&pool, &claims.sid).await.unwrap();
    assert!(!account::session_is_live(&pool, &claims.sid).await.unwrap());
}

#[tokio::test]
async fn profile_counts_activity() {
    let pool = seeded_pool().await;
    let config = test_config();
    let (session, _) = account::login(&pool, &config, credentials(ADMIN_EMAIL, ADMIN_PASSWORD, None))
        .await
        .unwrap();

    let profile = account::profile(&pool, session.user.id).await.unwrap();
    assert_eq!(profile.email, ADMIN_EMAIL);
    assert_eq!(profile.display_name, "Blog Admin");
    assert!(profile.is_master);
    assert_eq!(profile.comments_count, 0);
    assert_eq!(profile.likes_given, 0);
}

#[tokio::test]
async fn login_clears_out_expired_sessions() {
    let pool = seeded_pool().await;
    let config = test_config();
    let admin = common::master_id(&pool).await;

    let long_ago = chrono::Utc::now() - chrono::Duration::hours(2);
    sqlx::query("INSERT INTO sessions (id, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)")
        .bind("stale-session")
        .bind(admin)
        .bind(long_ago)
        .bind(long_ago + chrono::Duration::minutes(30))
        .execute(&pool)
        .await
        .unwrap();

    let (session, _) = account::login(&pool, &config, credentials(ADMIN_EMAIL, ADMIN_PASSWORD, None))
        .await
        .unwrap();

    let ids: Vec<String> = sqlx::query_scalar("SELECT id FROM sessions")
        .fetch_all(&pool)
        .await
        .unwrap();
    let claims = verify_jwt(&session.token, &config.jwt_secret).unwrap();
    assert_eq!(ids, vec![claims.sid]);
}
