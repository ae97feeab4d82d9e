// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{auth, community, interaction, profile, search},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Public reads and the auth endpoints are open.
/// * Writes, like state and `/api/user` sit behind `auth_middleware` (401, empty body).
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
        HeaderValue::from_static("http://localhost:5173"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let public_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/posts", get(community::list_posts))
        .route("/posts/trending", get(community::list_trending))
        .route("/posts/{id}", get(community::get_post))
        .route("/posts/{id}/comments", get(interaction::list_comments))
        .route("/users/{id}/posts", get(profile::user_posts))
        .route("/users/{id}/likes", get(profile::user_likes))
        .route("/search", get(search::search));

    let protected_routes = Router::new()
        .route("/user", get(auth::current_user))
        .route("/posts", post(community::create_post))
        .route("/posts/{id}/comments", post(interaction::create_comment))
        .route("/posts/{id}/liked", get(interaction::is_liked))
        .route("/posts/{id}/like", post(interaction::like_post))
        .route("/posts/{id}/unlike", post(interaction::unlike_post))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .nest("/api", public_routes.merge(protected_routes))
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
