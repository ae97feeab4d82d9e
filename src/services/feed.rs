// src/services/feed.rs

use crate::{
    error::AppError,
    models::{
        comment::{Comment, CreateCommentRequest, NewComment},
        post::{CreatePostRequest, MediaType, NewPost, Post},
    },
    store::{EntityStore, SharedStore},
};

pub const DEFAULT_TRENDING_LIMIT: usize = 10;
pub const MAX_TRENDING_LIMIT: usize = 100;

/// Publishing posts and comments, and the read-side views over them.
#[derive(Clone)]
pub struct FeedService {
    store: SharedStore,
}

impl FeedService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Publishes a post for `author_id`. The counter and timestamp are set by the store.
    ///
    /// Content is stored exactly as submitted; escaping is the renderer's job.
    pub async fn create_post(
        &self,
        author_id: i64,
        request: CreatePostRequest,
    ) -> Result<Post, AppError> {
        let media_type = request.media_type();

        let post = self
            .store
            .create_post(NewPost {
                user_id: author_id,
                content: request.content,
                media_url: request.media_url,
                media_type,
            })
            .await?;

        tracing::info!("User {} created post {} ({})", author_id, post.id, media_type);
        Ok(post)
    }

    pub async fn get_post(&self, post_id: i64) -> Result<Post, AppError> {
        self.store
            .get_post(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))
    }

    /// Every post, oldest first.
    pub async fn list_all(&self) -> Result<Vec<Post>, AppError> {
        self.store.get_posts().await
    }

    pub async fn list_by_user(&self, user_id: i64) -> Result<Vec<Post>, AppError> {
        self.store.get_posts_by_user(user_id).await
    }

    /// `MediaType::None` selects posts without a media URL.
    pub async fn list_by_media_type(&self, media_type: MediaType) -> Result<Vec<Post>, AppError> {
        let posts = self.store.get_posts().await?;

        Ok(posts
            .into_iter()
            .filter(|post| match media_type {
                MediaType::None => post.media_url.is_none(),
                other => post.media_type == other,
            })
            .collect())
    }

    /// Most-liked posts first. Equal counts keep creation order.
    pub async fn list_trending(&self, limit: Option<usize>) -> Result<Vec<Post>, AppError> {
        let limit = limit
            .unwrap_or(DEFAULT_TRENDING_LIMIT)
            .min(MAX_TRENDING_LIMIT);

        let mut posts = self.store.get_posts().await?;
        posts.sort_by(|a, b| b.likes.cmp(&a.likes));
        posts.truncate(limit);
        Ok(posts)
    }

    pub async fn create_comment(
        &self,
        author_id: i64,
        post_id: i64,
        request: CreateCommentRequest,
    ) -> Result<Comment, AppError> {
        let comment = self
            .store
            .create_comment(NewComment {
                post_id,
                user_id: author_id,
                content: request.content,
            })
            .await?;

        tracing::info!("User {} commented on post {}", author_id, post_id);
        Ok(comment)
    }

    /// Comments of a post, oldest first. Empty for an unknown post.
    pub async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>, AppError> {
        self.store.get_comments_by_post(post_id).await
    }
}
