// src/services/likes.rs

use crate::{
    error::AppError,
    models::like::{Like, LikeStatus},
    store::{EntityStore, SharedStore},
};

/// Like/unlike toggling. The store performs each transition as one transaction,
/// so `post.likes` always equals the number of like rows for the post.
#[derive(Clone)]
pub struct LikeService {
    store: SharedStore,
}

impl LikeService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// `Conflict` if `user_id` already likes the post, `NotFound` if the post doesn't exist.
    pub async fn like(&self, user_id: i64, post_id: i64) -> Result<LikeStatus, AppError> {
        match self.store.like_post(user_id, post_id).await {
            Ok(status) => {
                tracing::info!(
                    "User {} liked post {} (likes = {})",
                    user_id,
                    post_id,
                    status.likes
                );
                Ok(status)
            }
            Err(AppError::Conflict(msg)) => {
                tracing::warn!("User {} tried to like post {} twice", user_id, post_id);
                Err(AppError::Conflict(msg))
            }
            Err(e) => Err(e),
        }
    }

    /// No-op on the counter when the user never liked the post.
    pub async fn unlike(&self, user_id: i64, post_id: i64) -> Result<LikeStatus, AppError> {
        let status = self.store.unlike_post(user_id, post_id).await?;
        tracing::info!(
            "User {} unliked post {} (likes = {})",
            user_id,
            post_id,
            status.likes
        );
        Ok(status)
    }

    pub async fn is_liked(&self, user_id: i64, post_id: i64) -> Result<bool, AppError> {
        Ok(self.store.get_like(user_id, post_id).await?.is_some())
    }

    pub async fn likes_by_user(&self, user_id: i64) -> Result<Vec<Like>, AppError> {
        self.store.get_likes_by_user(user_id).await
    }
}
