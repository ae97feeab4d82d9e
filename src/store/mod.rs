// src/store/mod.rs

//! Persistent tables for users, posts, comments and likes.
//!
//! Services only see `dyn EntityStore`; `PgStore` is the production backend and
//! `MemoryStore` backs local runs without a database and the test suite.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{
        comment::{Comment, NewComment},
        like::{Like, LikeStatus},
        post::{NewPost, Post},
        user::{NewUser, User},
    },
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Handle shared by every service.
pub type SharedStore = Arc<dyn EntityStore>;

#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn get_user(&self, id: i64) -> Result<Option<User>, AppError>;

    /// Lookup path for authentication. Backed by the unique username index.
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Batch lookup. Unknown ids are skipped and the result order is unspecified.
    async fn get_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>, AppError>;

    /// Fails with `Conflict` when the username is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, AppError>;

    /// Assigns `id`, `likes = 0` and `created_at`. Fails with `NotFound` for an unknown author.
    async fn create_post(&self, post: NewPost) -> Result<Post, AppError>;

    /// All posts, oldest first.
    async fn get_posts(&self) -> Result<Vec<Post>, AppError>;

    async fn get_posts_by_user(&self, user_id: i64) -> Result<Vec<Post>, AppError>;

    async fn get_post(&self, id: i64) -> Result<Option<Post>, AppError>;

    /// Fails with `NotFound` when the post does not exist.
    async fn create_comment(&self, comment: NewComment) -> Result<Comment, AppError>;

    /// Comments of a post, oldest first.
    async fn get_comments_by_post(&self, post_id: i64) -> Result<Vec<Comment>, AppError>;

    async fn get_like(&self, user_id: i64, post_id: i64) -> Result<Option<Like>, AppError>;

    /// Inserts the like row and increments the post counter in one transaction.
    ///
    /// `NotFound` if the post or user is missing, `Conflict` if the pair already exists.
    /// Neither error leaves any change behind.
    async fn like_post(&self, user_id: i64, post_id: i64) -> Result<LikeStatus, AppError>;

    /// Deletes the like row and decrements the counter in one transaction.
    ///
    /// The counter only moves when a row was actually removed and never drops below zero.
    async fn unlike_post(&self, user_id: i64, post_id: i64) -> Result<LikeStatus, AppError>;

    async fn get_likes_by_user(&self, user_id: i64) -> Result<Vec<Like>, AppError>;
}
