// src/handlers/interaction.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::comment::CreateCommentRequest,
    services::{FeedService, LikeService},
    utils::{extract::ValidatedJson, jwt::Claims},
};

/// Like a post. 409 if the caller already likes it.
pub async fn like_post(
    State(likes): State<LikeService>,
    Extension(claims): Extension<Claims>,
    Path(post_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let status = likes.like(claims.user_id()?, post_id).await?;
    Ok(Json(status))
}

/// Remove the caller's like. Succeeds even if there was none.
pub async fn unlike_post(
    State(likes): State<LikeService>,
    Extension(claims): Extension<Claims>,
    Path(post_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let status = likes.unlike(claims.user_id()?, post_id).await?;
    Ok(Json(status))
}

/// Whether the caller likes the post, as a bare JSON boolean.
pub async fn is_liked(
    State(likes): State<LikeService>,
    Extension(claims): Extension<Claims>,
    Path(post_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(likes.is_liked(claims.user_id()?, post_id).await?))
}

/// Create a new comment.
pub async fn create_comment(
    State(feed): State<FeedService>,
    Extension(claims): Extension<Claims>,
    Path(post_id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<CreateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let comment = feed
        .create_comment(claims.user_id()?, post_id, payload)
        .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

/// List all comments for a post.
pub async fn list_comments(
    State(feed): State<FeedService>,
    Path(post_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(feed.list_comments(post_id).await?))
}
