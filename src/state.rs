// src/state.rs

use axum::extract::FromRef;

use crate::{
    config::Config,
    services::{AccountService, FeedService, LikeService, SearchService},
    store::SharedStore,
};

#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub config: Config,
}

impl AppState {
    pub fn new(store: SharedStore, config: Config) -> Self {
        Self { store, config }
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for AccountService {
    fn from_ref(state: &AppState) -> Self {
        AccountService::new(state.store.clone())
    }
}

impl FromRef<AppState> for FeedService {
    fn from_ref(state: &AppState) -> Self {
        FeedService::new(state.store.clone())
    }
}

impl FromRef<AppState> for LikeService {
    fn from_ref(state: &AppState) -> Self {
        LikeService::new(state.store.clone())
    }
}

impl FromRef<AppState> for SearchService {
    fn from_ref(state: &AppState) -> Self {
        SearchService::new(state.store.clone())
    }
}
