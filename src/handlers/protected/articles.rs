// handlers/protected/articles.rs - article CRUD scoped to the author
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::database::models::{Article, ArticleFilter, ArticlePatch};
use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::handlers::validation::FieldErrors;
use crate::middleware::{ApiResponse, ApiResult, Identity};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ArticleEnvelope<T> {
    pub article: T,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NewArticle {
    pub title: String,
    pub body: String,
    pub slug: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ArticleUpdate {
    pub title: Option<String>,
    pub body: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub author: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// POST /api/v1/articles
pub async fn create_article(
    State(state): State<AppState>,
    identity: Identity,
    payload: Result<Json<ArticleEnvelope<NewArticle>>, JsonRejection>,
) -> ApiResult<Article> {
    let Identity::Authenticated(author) = identity else {
        return Err(ApiError::InvalidAuthToken);
    };
    let Json(ArticleEnvelope { article: input }) = payload?;

    let mut errors = FieldErrors::new();
    errors.required("title", &input.title);
    errors.required("body", &input.body);
    errors.required("slug", &input.slug);
    errors.into_result()?;

    let mut article = Article::new(input.title, input.body, input.slug, &author);
    state.articles.create_article(&mut article).await?;
    tracing::info!("{} created article {}", author.username, article.slug);

    Ok(ApiResponse::created("article", article))
}

/// GET /api/v1/articles?author=&limit=&offset=
pub async fn list_articles(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Vec<Article>> {
    let Query(query) = query?;

    let filter = ArticleFilter {
        author_username: query.author.filter(|a| !a.is_empty()),
        limit: query.limit.unwrap_or(0),
        offset: query.offset.unwrap_or(0),
        ..Default::default()
    };

    let articles = state.articles.articles(filter).await?;
    Ok(ApiResponse::success("articles", articles))
}

/// GET /api/v1/articles/:slug
pub async fn get_article(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Article> {
    let article = find_article(&state, &slug).await?;
    Ok(ApiResponse::success("article", article))
}

/// PUT|PATCH /api/v1/articles/:slug - author only
pub async fn update_article(
    State(state): State<AppState>,
    identity: Identity,
    Path(slug): Path<String>,
    payload: Result<Json<ArticleEnvelope<ArticleUpdate>>, JsonRejection>,
) -> ApiResult<Article> {
    let Json(ArticleEnvelope { article: input }) = payload?;

    let mut article = find_article(&state, &slug).await?;
    ensure_author(&identity, &article)?;

    let patch = ArticlePatch {
        title: input.title,
        body: input.body,
    };
    state.articles.update_article(&mut article, patch).await?;

    Ok(ApiResponse::success("article", article))
}

/// DELETE /api/v1/articles/:slug - author only
pub async fn delete_article(
    State(state): State<AppState>,
    identity: Identity,
    Path(slug): Path<String>,
) -> ApiResult<()> {
    let article = find_article(&state, &slug).await?;
    ensure_author(&identity, &article)?;

    state.articles.delete_article(article.id).await?;
    tracing::info!("deleted article {}", article.slug);

    Ok(ApiResponse::no_content())
}

async fn find_article(state: &AppState, slug: &str) -> Result<Article, ApiError> {
    state.articles.article_by_slug(slug).await.map_err(|e| match e {
        DatabaseError::NotFound => ApiError::not_found("article", "requested article not found"),
        other => other.into(),
    })
}

/// 403 unless the caller wrote `article`
fn ensure_author(identity: &Identity, article: &Article) -> Result<(), ApiError> {
    match identity.user() {
        Some(user) if article.is_authored_by(user) => Ok(()),
        _ => Err(ApiError::forbidden("article", "forbidden request")),
    }
}
