// src/store/postgres.rs

use async_trait::async_trait;
use futures::future::BoxFuture;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};

use super::EntityStore;
use crate::{
    error::AppError,
    models::{
        comment::{Comment, NewComment},
        like::{Like, LikeStatus},
        post::{NewPost, Post, PostRow},
        user::{NewUser, User},
    },
};

const POST_COLUMNS: &str = "id, user_id, content, media_url, media_type, likes, created_at";

/// Runs `work` inside a database transaction.
///
/// Commits when `work` returns `Ok`, rolls back on `Err`. A dropped transaction
/// (panic, cancelled request) is rolled back by sqlx.
pub async fn with_transaction<T, F>(pool: &PgPool, work: F) -> Result<T, AppError>
where
    T: Send,
    F: for<'c> FnOnce(&'c mut Transaction<'static, Postgres>) -> BoxFuture<'c, Result<T, AppError>>
        + Send,
{
    let mut tx = pool.begin().await?;

    match work(&mut tx).await {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::error!("Failed to roll back transaction: {:?}", rollback_err);
            }
            Err(err)
        }
    }
}

/// Postgres-backed entity store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Takes the row lock on a post for the rest of the transaction and returns its counter.
async fn lock_post(conn: &mut PgConnection, post_id: i64) -> Result<i32, AppError> {
    sqlx::query_scalar::<_, i32>("SELECT likes FROM posts WHERE id = $1 FOR UPDATE")
        .bind(post_id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))
}

#[async_trait]
impl EntityStore for PgStore {
    async fn get_user(&self, id: i64) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn get_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, username, password, created_at FROM users WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password)
            VALUES ($1, $2)
            RETURNING id, username, password, created_at
            "#,
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::Conflict(format!("Username '{}' already exists", user.username))
            }
            e => {
                tracing::error!("Failed to create user: {:?}", e);
                AppError::from(e)
            }
        })
    }

    async fn create_post(&self, post: NewPost) -> Result<Post, AppError> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            r#"
            INSERT INTO posts (user_id, content, media_url, media_type)
            VALUES ($1, $2, $3, $4)
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(post.user_id)
        .bind(&post.content)
        .bind(&post.media_url)
        .bind(post.media_type.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                AppError::NotFound("User not found".to_string())
            }
            e => {
                tracing::error!("Failed to create post: {:?}", e);
                AppError::from(e)
            }
        })?;

        Ok(row.into())
    }

    async fn get_posts(&self) -> Result<Vec<Post>, AppError> {
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM posts ORDER BY created_at ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn get_posts_by_user(&self, user_id: i64) -> Result<Vec<Post>, AppError> {
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE user_id = $1 ORDER BY created_at ASC, id ASC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, AppError> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Post::from))
    }

    async fn create_comment(&self, comment: NewComment) -> Result<Comment, AppError> {
        // The existence check and the insert are one statement.
        sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (post_id, user_id, content)
            SELECT $1, $2, $3
            WHERE EXISTS (SELECT 1 FROM posts WHERE id = $1)
            RETURNING id, post_id, user_id, content, created_at
            "#,
        )
        .bind(comment.post_id)
        .bind(comment.user_id)
        .bind(&comment.content)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                AppError::NotFound("User not found".to_string())
            }
            e => {
                tracing::error!("Failed to create comment: {:?}", e);
                AppError::from(e)
            }
        })?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))
    }

    async fn get_comments_by_post(&self, post_id: i64) -> Result<Vec<Comment>, AppError> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, user_id, content, created_at
            FROM comments
            WHERE post_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    async fn get_like(&self, user_id: i64, post_id: i64) -> Result<Option<Like>, AppError> {
        let like = sqlx::query_as::<_, Like>(
            r#"
            SELECT id, user_id, post_id, created_at
            FROM likes
            WHERE user_id = $1 AND post_id = $2
            "#,
        )
        .bind(user_id)
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(like)
    }

    async fn like_post(&self, user_id: i64, post_id: i64) -> Result<LikeStatus, AppError> {
        with_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                // Serializes concurrent like/unlike calls on the same post.
                lock_post(&mut **tx, post_id).await?;

                let inserted = sqlx::query_scalar::<_, i64>(
                    r#"
                    INSERT INTO likes (user_id, post_id)
                    VALUES ($1, $2)
                    ON CONFLICT (user_id, post_id) DO NOTHING
                    RETURNING id
                    "#,
                )
                .bind(user_id)
                .bind(post_id)
                .fetch_optional(&mut **tx)
                .await
                .map_err(|e| match e {
                    sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                        AppError::NotFound("User not found".to_string())
                    }
                    e => AppError::from(e),
                })?;

                if inserted.is_none() {
                    return Err(AppError::Conflict("Post already liked".to_string()));
                }

                let likes = sqlx::query_scalar::<_, i32>(
                    "UPDATE posts SET likes = likes + 1 WHERE id = $1 RETURNING likes",
                )
                .bind(post_id)
                .fetch_one(&mut **tx)
                .await?;

                Ok(LikeStatus {
                    post_id,
                    liked: true,
                    likes,
                })
            })
        })
        .await
    }

    async fn unlike_post(&self, user_id: i64, post_id: i64) -> Result<LikeStatus, AppError> {
        with_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                let current = lock_post(&mut **tx, post_id).await?;

                let removed = sqlx::query("DELETE FROM likes WHERE user_id = $1 AND post_id = $2")
                    .bind(user_id)
                    .bind(post_id)
                    .execute(&mut **tx)
                    .await?
                    .rows_affected();

                if removed == 0 {
                    return Ok(LikeStatus {
                        post_id,
                        liked: false,
                        likes: current,
                    });
                }

                let likes = sqlx::query_scalar::<_, i32>(
                    "UPDATE posts SET likes = GREATEST(0, likes - 1) WHERE id = $1 RETURNING likes",
                )
                .bind(post_id)
                .fetch_one(&mut **tx)
                .await?;

                Ok(LikeStatus {
                    post_id,
                    liked: false,
                    likes,
                })
            })
        })
        .await
    }

    async fn get_likes_by_user(&self, user_id: i64) -> Result<Vec<Like>, AppError> {
        let likes = sqlx::query_as::<_, Like>(
            r#"
            SELECT id, user_id, post_id, created_at
            FROM likes
            WHERE user_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(likes)
    }
}
