use diesel::prelude::*;
use uuid::Uuid;

use hirelink_shared::clients::db::DbPool;
use hirelink_shared::errors::{AppError, AppResult};
use hirelink_shared::types::PaginationParams;

use crate::models::{Article, NewArticle};
use crate::schema::articles;

fn get_conn(pool: &DbPool) -> AppResult<diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<PgConnection>>> {
    pool.get().map_err(|e| {
        tracing::error!(error = %e, "failed to get db connection");
        AppError::internal("database connection error")
    })
}

pub fn publish(
    pool: &DbPool,
    author_id: Uuid,
    title: String,
    content: String,
    category: Option<String>,
) -> AppResult<Article> {
    let mut conn = get_conn(pool)?;
    let article = diesel::insert_into(articles::table)
        .values(&NewArticle {
            author_id,
            title,
            content,
            category,
            published: true,
        })
        .get_result::<Article>(&mut conn)?;
    tracing::info!(article_id = %article.id, "article published");
    Ok(article)
}

pub fn list_public(pool: &DbPool, pagination: &PaginationParams) -> AppResult<(Vec<Article>, i64)> {
    let mut conn = get_conn(pool)?;
    let items = articles::table
        .filter(articles::published.eq(true))
        .order(articles::created_at.desc())
        .limit(pagination.limit() as i64)
        .offset(pagination.offset() as i64)
        .load::<Article>(&mut conn)?;
    let total = articles::table
        .filter(articles::published.eq(true))
        .count()
        .get_result::<i64>(&mut conn)?;
    Ok((items, total))
}
