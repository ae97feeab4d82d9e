// src/handlers/search.rs

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{
    error::AppError,
    services::{SearchScope, SearchService},
};

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    #[serde(default, rename = "type")]
    pub scope: SearchScope,
}

/// `GET /api/search?q=&type=posts|users|all`
pub async fn search(
    State(search): State<SearchService>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(search.search(&params.q, params.scope).await?))
}
