// tests/postgres_tests.rs
//
// Runs against a real Postgres: `DATABASE_URL=... cargo test -- --ignored`

use std::sync::Arc;

use community_notes::{
    error::AppError,
    models::{
        post::{MediaType, NewPost},
        user::NewUser,
    },
    services::{FeedService, LikeService},
    store::{EntityStore, PgStore, SharedStore},
};
use sqlx::postgres::PgPoolOptions;

async fn store() -> SharedStore {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    Arc::new(PgStore::new(pool))
}

async fn user(store: &SharedStore, prefix: &str) -> i64 {
    // Truncate UUID to keep usernames short
    let username = format!("{}_{}", prefix, &uuid::Uuid::new_v4().to_string()[..8]);
    store
        .create_user(NewUser {
            username,
            password_hash: "not-a-real-hash".to_string(),
        })
        .await
        .unwrap()
        .id
}

async fn post(store: &SharedStore, user_id: i64) -> i64 {
    store
        .create_post(NewPost {
            user_id,
            content: "pg test".to_string(),
            media_url: None,
            media_type: MediaType::None,
        })
        .await
        .unwrap()
        .id
}

async fn like_rows(store: &SharedStore, user_ids: &[i64], post_id: i64) -> usize {
    let mut rows = 0;
    for user_id in user_ids {
        if store.get_like(*user_id, post_id).await.unwrap().is_some() {
            rows += 1;
        }
    }
    rows
}

#[tokio::test]
#[ignore]
async fn concurrent_likes_are_counted_exactly() {
    let store = store().await;
    let author = user(&store, "author").await;
    let post_id = post(&store, author).await;

    let mut fans = Vec::new();
    for _ in 0..10 {
        fans.push(user(&store, "fan").await);
    }

    let likes = LikeService::new(store.clone());
    let mut handles = Vec::new();
    for &fan in &fans {
        for _ in 0..2 {
            let likes = likes.clone();
            handles.push(tokio::spawn(async move { likes.like(fan, post_id).await }));
        }
    }

    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => {}
            Err(AppError::Conflict(_)) => conflicts += 1,
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    assert_eq!(conflicts, fans.len());
    let post = FeedService::new(store.clone()).get_post(post_id).await.unwrap();
    assert_eq!(post.likes as usize, fans.len());
    assert_eq!(like_rows(&store, &fans, post_id).await, fans.len());
}

#[tokio::test]
#[ignore]
async fn unlike_without_like_keeps_counter() {
    let store = store().await;
    let author = user(&store, "author").await;
    let stranger = user(&store, "stranger").await;
    let post_id = post(&store, author).await;

    let likes = LikeService::new(store.clone());
    likes.like(author, post_id).await.unwrap();

    let status = likes.unlike(stranger, post_id).await.unwrap();
    assert_eq!(status.likes, 1);

    assert_eq!(likes.unlike(author, post_id).await.unwrap().likes, 0);
    assert_eq!(likes.unlike(author, post_id).await.unwrap().likes, 0);
}

#[tokio::test]
#[ignore]
async fn missing_post_is_not_found() {
    let store = store().await;
    let author = user(&store, "author").await;
    let likes = LikeService::new(store.clone());

    assert!(matches!(
        likes.like(author, i64::MAX).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
#[ignore]
async fn like_from_unknown_user_is_not_found() {
    let store = store().await;
    let author = user(&store, "author").await;
    let post_id = post(&store, author).await;
    let likes = LikeService::new(store.clone());

    assert!(matches!(
        likes.like(i64::MAX, post_id).await,
        Err(AppError::NotFound(_))
    ));
    assert!(likes.likes_by_user(i64::MAX).await.unwrap().is_empty());
    let post = FeedService::new(store).get_post(post_id).await.unwrap();
    assert_eq!(post.likes, 0);
}

#[tokio::test]
#[ignore]
async fn authors_are_fetched_in_one_batch() {
    let store = store().await;
    let first = user(&store, "batch").await;
    let second = user(&store, "batch").await;

    let users = store.get_users_by_ids(&[second, first, i64::MAX]).await.unwrap();
    let mut ids: Vec<i64> = users.into_iter().map(|u| u.id).collect();
    ids.sort();
    assert_eq!(ids, vec![first, second]);
}
