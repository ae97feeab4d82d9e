// src/models/like.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'likes' table: one row per (user, post) pair.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub id: i64,
    pub user_id: i64,
    pub post_id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Result of a like/unlike call: the caller's membership and the post's counter afterwards.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LikeStatus {
    pub post_id: i64,
    pub liked: bool,
    pub likes: i32,
}
