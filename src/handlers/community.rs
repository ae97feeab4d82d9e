// src/handlers/community.rs

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::post::{CreatePostRequest, PostListParams, TrendingParams},
    services::FeedService,
    utils::{extract::ValidatedJson, jwt::Claims},
};

/// Create a new post as the authenticated user.
pub async fn create_post(
    State(feed): State<FeedService>,
    Extension(claims): Extension<Claims>,
    ValidatedJson(payload): ValidatedJson<CreatePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    let post = feed.create_post(claims.user_id()?, payload).await?;

    Ok((StatusCode::CREATED, Json(post)))
}

/// List posts, oldest first.
/// `?media=none|photo|video` narrows the feed to one media type.
pub async fn list_posts(
    State(feed): State<FeedService>,
    Query(params): Query<PostListParams>,
) -> Result<impl IntoResponse, AppError> {
    let posts = match params.media {
        Some(media_type) => feed.list_by_media_type(media_type).await?,
        None => feed.list_all().await?,
    };

    Ok(Json(posts))
}

/// Most-liked posts (default 10, max 100).
pub async fn list_trending(
    State(feed): State<FeedService>,
    Query(params): Query<TrendingParams>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(feed.list_trending(params.limit).await?))
}

/// Get a single post by ID.
pub async fn get_post(
    State(feed): State<FeedService>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(feed.get_post(id).await?))
}
