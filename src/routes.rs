// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{account, comment, home, post},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Public routes: front page, single post, login, register.
/// * Everything else sits behind `auth_middleware`; master-only checks
///   happen in the post services.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let public_routes = Router::new()
        .route("/", get(home::index))
        .route("/post/{id}", get(home::show_post))
        .route("/account/login", post(account::login))
        .route("/account/register", post(account::register));

    let protected_routes = Router::new()
        .route("/account/logout", post(account::logout))
        .route("/account/profile", get(account::profile))
        .route("/post/create", get(post::create_form).post(post::create))
        .route("/post/edit/{id}", get(post::edit_form).post(post::edit))
        .route("/post/delete/{id}", post(post::delete))
        .route("/post/like/{id}", post(post::like))
        .route("/comment/add", post(comment::add))
        .route("/comment/like/{id}", post(comment::like))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        // Global Middleware (applied top to bottom)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
