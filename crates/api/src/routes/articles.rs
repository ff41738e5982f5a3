//! Catalog listing endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use domain::Article;
use serde::Serialize;

use super::AppState;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct ArticleResponse {
    pub code: String,
    pub name: String,
    pub price_cents: i64,
}

impl From<Article> for ArticleResponse {
    fn from(article: Article) -> Self {
        Self {
            code: article.code.to_string(),
            name: article.name,
            price_cents: article.price.cents(),
        }
    }
}

/// GET /articles: list the catalog, sorted by article code.
#[tracing::instrument(skip(state))]
pub async fn list(State(state): State<Arc<AppState>>) -> Result<Json<Vec<ArticleResponse>>, ApiError> {
    let articles = state.service.articles()?;
    Ok(Json(articles.into_iter().map(ArticleResponse::from).collect()))
}
