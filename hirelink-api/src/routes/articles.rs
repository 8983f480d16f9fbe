use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use hirelink_shared::errors::AppResult;
use hirelink_shared::middleware::EmployerUser;
use hirelink_shared::types::{ApiResponse, Paginated, PaginationParams};

use crate::models::Article;
use crate::services::{article_service, dispatch};
use crate::AppState;

/// GET /articles
pub async fn list_articles(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Paginated<Article>>> {
    let (items, total) = article_service::list_public(&state.db, &params)?;
    Ok(Json(Paginated::new(items, total as u64, &params)))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PublishArticleRequest {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "content is required"))]
    pub content: String,
    #[validate(length(max = 50))]
    pub category: Option<String>,
}

/// POST /articles
/// Publishing fans out an `article_published` notification to active users.
pub async fn publish_article(
    State(state): State<Arc<AppState>>,
    EmployerUser(author): EmployerUser,
    Json(req): Json<PublishArticleRequest>,
) -> AppResult<Json<ApiResponse<Article>>> {
    req.validate()?;
    let article =
        article_service::publish(&state.db, author.id, req.title, req.content, req.category)?;
    dispatch::article_published(&state.db, &article);
    Ok(Json(ApiResponse::ok_with_message(article, "article published")))
}
