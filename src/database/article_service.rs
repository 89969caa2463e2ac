use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use crate::database::manager::{unique_violation, DatabaseError};
use crate::database::models::{Article, ArticleFilter, ArticlePatch};
use crate::database::query_builder::{limit_offset, WhereBuilder};
use crate::database::service::ArticleService;
use crate::database::user_service::find_user_by_id;

const ARTICLE_COLUMNS: &str = "id, title, body, slug, author_id, created_at, updated_at";

/// Postgres-backed [`ArticleService`]
#[derive(Clone)]
pub struct PgArticleService {
    pool: PgPool,
}

impl PgArticleService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ArticleService for PgArticleService {
    async fn create_article(&self, article: &mut Article) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        insert_article(&mut *tx, article).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn articles(&self, filter: ArticleFilter) -> Result<Vec<Article>, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let articles = find_articles(&mut *tx, &filter).await?;
        tx.commit().await?;
        Ok(articles)
    }

    async fn update_article(
        &self,
        article: &mut Article,
        patch: ArticlePatch,
    ) -> Result<(), DatabaseError> {
        let result = async {
            let mut tx = self.pool.begin().await?;
            write_article(&mut *tx, article, patch).await?;
            tx.commit().await?;
            Ok::<_, DatabaseError>(())
        }
        .await;

        result.map_err(|e| {
            tracing::error!("error updating article {}: {}", article.id, e);
            DatabaseError::Storage
        })
    }

    async fn delete_article(&self, id: i64) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let deleted = sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tx.commit().await?;

        if deleted == 0 {
            tracing::debug!("delete of article {} matched no rows", id);
        }
        Ok(())
    }
}

async fn insert_article(
    conn: &mut PgConnection,
    article: &mut Article,
) -> Result<(), DatabaseError> {
    let row: (i64, DateTime<Utc>, DateTime<Utc>) = sqlx::query_as(
        "INSERT INTO articles (title, body, author_id, slug)
         VALUES ($1, $2, $3, $4)
         RETURNING id, created_at, updated_at",
    )
    .bind(&article.title)
    .bind(&article.body)
    .bind(article.author_id)
    .bind(&article.slug)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| match unique_violation(&e) {
        Some(_) => DatabaseError::DuplicateSlug,
        None => DatabaseError::Sqlx(e),
    })?;

    (article.id, article.created_at, article.updated_at) = row;
    Ok(())
}

/// Build the conjunctive WHERE clause for `filter`.
///
/// Predicate order is fixed: id, author id, slug, title, author username.
pub(crate) fn article_where(filter: &ArticleFilter) -> WhereBuilder {
    let mut where_builder = WhereBuilder::new();
    where_builder.eq_opt("id", filter.id);
    where_builder.eq_opt("author_id", filter.author_id);
    where_builder.eq_opt("slug", filter.slug.as_deref());
    where_builder.eq_opt("title", filter.title.as_deref());
    if let Some(username) = filter.author_username.as_deref() {
        where_builder.push_with(
            |n| format!("author_id = (SELECT id FROM users WHERE username = ${})", n),
            username,
        );
    }
    where_builder
}

async fn find_articles(
    conn: &mut PgConnection,
    filter: &ArticleFilter,
) -> Result<Vec<Article>, DatabaseError> {
    let where_builder = article_where(filter);
    let sql = format!(
        "SELECT {} FROM articles{} ORDER BY created_at DESC, id DESC{}",
        ARTICLE_COLUMNS,
        where_builder.where_clause(),
        limit_offset(filter.limit, filter.offset)
    );

    let mut articles = where_builder
        .bind(sqlx::query_as::<_, Article>(&sql))
        .fetch_all(&mut *conn)
        .await?;

    // One author lookup per row
    for article in articles.iter_mut() {
        let author = find_user_by_id(&mut *conn, article.author_id)
            .await
            .map_err(|e| {
                tracing::error!(
                    "cannot find author {} of article {}: {}",
                    article.author_id,
                    article.id,
                    e
                );
                e
            })?;
        article.author = Some(author);
    }

    Ok(articles)
}

async fn write_article(
    conn: &mut PgConnection,
    article: &mut Article,
    patch: ArticlePatch,
) -> Result<(), DatabaseError> {
    patch.apply(article);

    let (updated_at,): (DateTime<Utc>,) = sqlx::query_as(
        "UPDATE articles
         SET body = $1, title = $2, updated_at = NOW()
         WHERE id = $3
         RETURNING updated_at",
    )
    .bind(&article.body)
    .bind(&article.title)
    .bind(article.id)
    .fetch_one(&mut *conn)
    .await?;

    article.updated_at = updated_at;
    Ok(())
}
