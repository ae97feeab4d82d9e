// src/store/memory.rs

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::EntityStore;
use crate::{
    error::AppError,
    models::{
        comment::{Comment, NewComment},
        like::{Like, LikeStatus},
        post::{NewPost, Post},
        user::{NewUser, User},
    },
};

/// In-process copy of the four tables.
///
/// Ids are handed out in insertion order, so iterating a `BTreeMap` by id
/// is creation order.
#[derive(Debug, Clone, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    usernames: HashMap<String, i64>,
    posts: BTreeMap<i64, Post>,
    comments: BTreeMap<i64, Comment>,
    /// Keyed by (user_id, post_id), which enforces the pair uniqueness.
    likes: BTreeMap<(i64, i64), Like>,
    last_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    /// Applies `delta` to a post's counter, floored at zero, and returns the new value.
    fn adjust_likes(&mut self, post_id: i64, delta: i32) -> i32 {
        self.posts
            .get_mut(&post_id)
            .map(|post| {
                post.likes = (post.likes + delta).max(0);
                post.likes
            })
            .unwrap_or_default()
    }
}

/// Entity store kept in memory behind an async `RwLock`.
///
/// Used when no database is configured and as the store in tests.
/// Data is lost on process restart.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `work` against the live tables while holding the write lock.
    ///
    /// Every unit of work does all of its checks before its first mutation, so an
    /// `Err` always leaves the tables untouched.
    async fn with_transaction<T, F>(&self, work: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut Tables) -> Result<T, AppError>,
    {
        let mut tables = self.tables.write().await;
        work(&mut tables)
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn get_user(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .usernames
            .get(username)
            .and_then(|id| tables.users.get(id))
            .cloned())
    }

    async fn get_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.users.get(id))
            .cloned()
            .collect())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        self.with_transaction(|tables| {
            if tables.usernames.contains_key(&user.username) {
                return Err(AppError::Conflict(format!(
                    "Username '{}' already exists",
                    user.username
                )));
            }

            let id = tables.next_id();
            let created = User {
                id,
                username: user.username,
                password: user.password_hash,
                created_at: Utc::now(),
            };
            tables.usernames.insert(created.username.clone(), id);
            tables.users.insert(id, created.clone());
            Ok(created)
        })
        .await
    }

    async fn create_post(&self, post: NewPost) -> Result<Post, AppError> {
        self.with_transaction(|tables| {
            if !tables.users.contains_key(&post.user_id) {
                return Err(AppError::NotFound("User not found".to_string()));
            }

            let id = tables.next_id();
            let created = Post {
                id,
                user_id: post.user_id,
                content: post.content,
                media_url: post.media_url,
                media_type: post.media_type,
                likes: 0,
                created_at: Utc::now(),
            };
            tables.posts.insert(id, created.clone());
            Ok(created)
        })
        .await
    }

    async fn get_posts(&self) -> Result<Vec<Post>, AppError> {
        Ok(self.tables.read().await.posts.values().cloned().collect())
    }

    async fn get_posts_by_user(&self, user_id: i64) -> Result<Vec<Post>, AppError> {
        Ok(self
            .tables
            .read()
            .await
            .posts
            .values()
            .filter(|post| post.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, AppError> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn create_comment(&self, comment: NewComment) -> Result<Comment, AppError> {
        self.with_transaction(|tables| {
            if !tables.posts.contains_key(&comment.post_id) {
                return Err(AppError::NotFound("Post not found".to_string()));
            }
            if !tables.users.contains_key(&comment.user_id) {
                return Err(AppError::NotFound("User not found".to_string()));
            }

            let id = tables.next_id();
            let created = Comment {
                id,
                post_id: comment.post_id,
                user_id: comment.user_id,
                content: comment.content,
                created_at: Utc::now(),
            };
            tables.comments.insert(id, created.clone());
            Ok(created)
        })
        .await
    }

    async fn get_comments_by_post(&self, post_id: i64) -> Result<Vec<Comment>, AppError> {
        Ok(self
            .tables
            .read()
            .await
            .comments
            .values()
            .filter(|comment| comment.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn get_like(&self, user_id: i64, post_id: i64) -> Result<Option<Like>, AppError> {
        Ok(self
            .tables
            .read()
            .await
            .likes
            .get(&(user_id, post_id))
            .cloned())
    }

    async fn like_post(&self, user_id: i64, post_id: i64) -> Result<LikeStatus, AppError> {
        self.with_transaction(|tables| {
            if !tables.posts.contains_key(&post_id) {
                return Err(AppError::NotFound("Post not found".to_string()));
            }
            if !tables.users.contains_key(&user_id) {
                return Err(AppError::NotFound("User not found".to_string()));
            }
            if tables.likes.contains_key(&(user_id, post_id)) {
                return Err(AppError::Conflict("Post already liked".to_string()));
            }

            let id = tables.next_id();
            tables.likes.insert(
                (user_id, post_id),
                Like {
                    id,
                    user_id,
                    post_id,
                    created_at: Utc::now(),
                },
            );

            Ok(LikeStatus {
                post_id,
                liked: true,
                likes: tables.adjust_likes(post_id, 1),
            })
        })
        .await
    }

    async fn unlike_post(&self, user_id: i64, post_id: i64) -> Result<LikeStatus, AppError> {
        self.with_transaction(|tables| {
            let Some(current) = tables.posts.get(&post_id).map(|post| post.likes) else {
                return Err(AppError::NotFound("Post not found".to_string()));
            };

            let likes = match tables.likes.remove(&(user_id, post_id)) {
                Some(_) => tables.adjust_likes(post_id, -1),
                None => current,
            };

            Ok(LikeStatus {
                post_id,
                liked: false,
                likes,
            })
        })
        .await
    }

    async fn get_likes_by_user(&self, user_id: i64) -> Result<Vec<Like>, AppError> {
        let tables = self.tables.read().await;
        let mut likes: Vec<Like> = tables
            .likes
            .values()
            .filter(|like| like.user_id == user_id)
            .cloned()
            .collect();
        likes.sort_by_key(|like| like.id);
        Ok(likes)
    }
}
