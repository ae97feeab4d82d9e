// src/handlers/profile.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::{
    error::AppError,
    services::{FeedService, LikeService},
};

/// Posts written by a user. Empty for an unknown user.
pub async fn user_posts(
    State(feed): State<FeedService>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(feed.list_by_user(user_id).await?))
}

/// Like rows owned by a user.
pub async fn user_likes(
    State(likes): State<LikeService>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(likes.likes_by_user(user_id).await?))
}
