// src/services/search.rs

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    models::{post::Post, user::User},
    store::{EntityStore, SharedStore},
};

/// Which result kinds a search returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchScope {
    Posts,
    Users,
    #[default]
    All,
}

impl SearchScope {
    fn includes_posts(self) -> bool {
        matches!(self, SearchScope::Posts | SearchScope::All)
    }

    fn includes_users(self) -> bool {
        matches!(self, SearchScope::Users | SearchScope::All)
    }
}

/// Keys for scopes that were not requested are left out of the JSON.
#[derive(Debug, Default, Serialize)]
pub struct SearchResults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posts: Option<Vec<Post>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<User>>,
}

/// Case-insensitive substring search over post content and usernames.
#[derive(Clone)]
pub struct SearchService {
    store: SharedStore,
}

impl SearchService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// An empty query matches everything.
    ///
    /// User candidates are the authors of existing posts, in the order they first
    /// posted; a user with no posts never shows up.
    pub async fn search(&self, query: &str, scope: SearchScope) -> Result<SearchResults, AppError> {
        let needle = query.to_lowercase();
        let posts = self.store.get_posts().await?;
        let mut results = SearchResults::default();

        if scope.includes_users() {
            let mut seen = HashSet::new();
            let author_ids: Vec<i64> = posts
                .iter()
                .map(|post| post.user_id)
                .filter(|id| seen.insert(*id))
                .collect();

            let mut by_id: HashMap<i64, User> = self
                .store
                .get_users_by_ids(&author_ids)
                .await?
                .into_iter()
                .map(|user| (user.id, user))
                .collect();

            let mut users = Vec::new();
            for author_id in author_ids {
                match by_id.remove(&author_id) {
                    Some(user) if user.username.to_lowercase().contains(&needle) => {
                        users.push(user)
                    }
                    Some(_) => {}
                    None => tracing::warn!("Post author {} has no user row", author_id),
                }
            }
            results.users = Some(users);
        }

        if scope.includes_posts() {
            results.posts = Some(
                posts
                    .into_iter()
                    .filter(|post| post.content.to_lowercase().contains(&needle))
                    .collect(),
            );
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use async_trait::async_trait;

    use super::*;
    use crate::{
        models::{
            comment::{Comment, NewComment},
            like::{Like, LikeStatus},
            post::NewPost,
            user::NewUser,
        },
        services::test_support,
    };

    async fn fixture() -> SearchService {
        let store = test_support::store();
        let abc_fan = test_support::user(&store, "xAbCx").await;
        let other = test_support::user(&store, "other").await;
        // Matches the query but never posts.
        test_support::user(&store, "abc_lurker").await;

        test_support::post(&store, abc_fan.id, "nothing here").await;
        test_support::post(&store, other.id, "I like ABC songs").await;
        test_support::post(&store, other.id, "abc again").await;

        SearchService::new(store)
    }

    #[tokio::test]
    async fn all_scope_matches_posts_and_posting_users() {
        let search = fixture().await;
        let results = search.search("abc", SearchScope::All).await.unwrap();

        let contents: Vec<String> = results
            .posts
            .unwrap()
            .into_iter()
            .map(|p| p.content)
            .collect();
        assert_eq!(contents, vec!["I like ABC songs", "abc again"]);

        let names: Vec<String> = results
            .users
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(names, vec!["xAbCx"]);
    }

    #[tokio::test]
    async fn scope_limits_result_kinds() {
        let search = fixture().await;

        let posts_only = search.search("abc", SearchScope::Posts).await.unwrap();
        assert!(posts_only.posts.is_some());
        assert!(posts_only.users.is_none());

        let users_only = search.search("abc", SearchScope::Users).await.unwrap();
        assert!(users_only.posts.is_none());
        assert_eq!(users_only.users.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn empty_query_matches_everything() {
        let search = fixture().await;
        let results = search.search("", SearchScope::All).await.unwrap();

        assert_eq!(results.posts.unwrap().len(), 3);
        // Two distinct authors; the lurker has no posts.
        assert_eq!(results.users.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn users_keep_first_post_order() {
        let store = test_support::store();
        let late = test_support::user(&store, "late_abc").await;
        let early = test_support::user(&store, "early_abc").await;
        test_support::post(&store, early.id, "one").await;
        test_support::post(&store, late.id, "two").await;
        test_support::post(&store, early.id, "three").await;

        let search = SearchService::new(store);
        let names: Vec<String> = search
            .search("ABC", SearchScope::Users)
            .await
            .unwrap()
            .users
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(names, vec!["early_abc", "late_abc"]);
    }

    #[tokio::test]
    async fn authors_are_loaded_in_one_batch() {
        let inner = test_support::store();
        for i in 0..20 {
            let author = test_support::user(&inner, &format!("author{}", i)).await;
            test_support::post(&inner, author.id, "post").await;
        }

        let store = Arc::new(CountingStore {
            inner,
            user_reads: AtomicUsize::new(0),
        });
        let search = SearchService::new(store.clone());
        let users = search.search("author", SearchScope::Users).await.unwrap();

        assert_eq!(users.users.unwrap().len(), 20);
        assert_eq!(store.user_reads.load(Ordering::SeqCst), 1);
    }

    /// Counts user reads, delegating everything to a memory store.
    struct CountingStore {
        inner: SharedStore,
        user_reads: AtomicUsize,
    }

    #[async_trait]
    impl EntityStore for CountingStore {
        async fn get_user(&self, id: i64) -> Result<Option<User>, AppError> {
            self.user_reads.fetch_add(1, Ordering::SeqCst);
            self.inner.get_user(id).await
        }

        async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
            self.inner.get_user_by_username(username).await
        }

        async fn get_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>, AppError> {
            self.user_reads.fetch_add(1, Ordering::SeqCst);
            self.inner.get_users_by_ids(ids).await
        }

        async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
            self.inner.create_user(user).await
        }

        async fn create_post(&self, post: NewPost) -> Result<Post, AppError> {
            self.inner.create_post(post).await
        }

        async fn get_posts(&self) -> Result<Vec<Post>, AppError> {
            self.inner.get_posts().await
        }

        async fn get_posts_by_user(&self, user_id: i64) -> Result<Vec<Post>, AppError> {
            self.inner.get_posts_by_user(user_id).await
        }

        async fn get_post(&self, id: i64) -> Result<Option<Post>, AppError> {
            self.inner.get_post(id).await
        }

        async fn create_comment(&self, comment: NewComment) -> Result<Comment, AppError> {
            self.inner.create_comment(comment).await
        }

        async fn get_comments_by_post(&self, post_id: i64) -> Result<Vec<Comment>, AppError> {
            self.inner.get_comments_by_post(post_id).await
        }

        async fn get_like(&self, user_id: i64, post_id: i64) -> Result<Option<Like>, AppError> {
            self.inner.get_like(user_id, post_id).await
        }

        async fn like_post(&self, user_id: i64, post_id: i64) -> Result<LikeStatus, AppError> {
            self.inner.like_post(user_id, post_id).await
        }

        async fn unlike_post(&self, user_id: i64, post_id: i64) -> Result<LikeStatus, AppError> {
            self.inner.unlike_post(user_id, post_id).await
        }

        async fn get_likes_by_user(&self, user_id: i64) -> Result<Vec<Like>, AppError> {
            self.inner.get_likes_by_user(user_id).await
        }
    }

    #[test]
    fn omitted_scopes_are_not_serialized() {
        let json = serde_json::to_value(SearchResults {
            posts: Some(Vec::new()),
            users: None,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({ "posts": [] }));
    }
}
