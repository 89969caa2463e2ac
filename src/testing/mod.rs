//! In-memory service doubles and request helpers for router-level tests.
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::Value;
use tower::ServiceExt;

use crate::auth::password::MIN_BCRYPT_COST;
use crate::auth::TokenIssuer;
use crate::config::SecurityConfig;
use crate::database::models::{Article, ArticleFilter, ArticlePatch, User, UserFilter, UserPatch};
use crate::database::{ArticleService, DatabaseError, UserService};
use crate::routes::app;
use crate::state::AppState;

pub const TEST_SECRET: &str = "test-secret";

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    articles: Vec<Article>,
    next_user_id: i64,
    next_article_id: i64,
}

/// Both services over shared vectors, mirroring the Postgres constraints
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn article_count(&self) -> usize {
        self.tables.lock().unwrap().articles.len()
    }
}

fn page<T>(rows: Vec<T>, limit: i64, offset: i64) -> Vec<T> {
    let rows = rows.into_iter().skip(offset.max(0) as usize);
    if limit > 0 {
        rows.take(limit as usize).collect()
    } else {
        rows.collect()
    }
}

#[async_trait]
impl UserService for InMemoryStore {
    async fn create_user(&self, user: &mut User) -> Result<(), DatabaseError> {
        let mut tables = self.tables.lock().unwrap();
        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(DatabaseError::DuplicateUsername);
        }

        tables.next_user_id += 1;
        user.id = tables.next_user_id;
        user.created_at = Utc::now();
        user.updated_at = user.created_at;

        let mut row = user.clone();
        row.token = None;
        tables.users.push(row);
        Ok(())
    }

    async fn users(&self, filter: UserFilter) -> Result<Vec<User>, DatabaseError> {
        let tables = self.tables.lock().unwrap();
        let mut rows: Vec<User> = tables
            .users
            .iter()
            .filter(|u| filter.id.map_or(true, |id| u.id == id))
            .filter(|u| filter.username.as_ref().map_or(true, |name| &u.username == name))
            .cloned()
            .collect();
        rows.sort_by_key(|u| u.id);
        Ok(page(rows, filter.limit, filter.offset))
    }

    async fn update_user(&self, user: &mut User, patch: UserPatch) -> Result<(), DatabaseError> {
        let mut tables = self.tables.lock().unwrap();
        let mut updated = user.clone();
        patch.apply(&mut updated);

        if tables
            .users
            .iter()
            .any(|u| u.id != updated.id && u.username == updated.username)
        {
            return Err(DatabaseError::DuplicateUsername);
        }

        let row = tables
            .users
            .iter_mut()
            .find(|u| u.id == updated.id)
            .ok_or(DatabaseError::Storage)?;
        updated.updated_at = Utc::now();
        row.username = updated.username.clone();
        row.password_hash = updated.password_hash.clone();
        row.updated_at = updated.updated_at;

        *user = updated;
        Ok(())
    }
}

#[async_trait]
impl ArticleService for InMemoryStore {
    async fn create_article(&self, article: &mut Article) -> Result<(), DatabaseError> {
        let mut tables = self.tables.lock().unwrap();
        if tables.articles.iter().any(|a| a.slug == article.slug) {
            return Err(DatabaseError::DuplicateSlug);
        }

        tables.next_article_id += 1;
        article.id = tables.next_article_id;
        article.created_at = Utc::now();
        article.updated_at = article.created_at;

        let mut row = article.clone();
        row.author = None;
        tables.articles.push(row);
        Ok(())
    }

    async fn articles(&self, filter: ArticleFilter) -> Result<Vec<Article>, DatabaseError> {
        let tables = self.tables.lock().unwrap();
        let author_by_name = filter.author_username.as_ref().map(|name| {
            tables
                .users
                .iter()
                .find(|u| &u.username == name)
                .map(|u| u.id)
        });

        let mut rows: Vec<Article> = tables
            .articles
            .iter()
            .filter(|a| filter.id.map_or(true, |id| a.id == id))
            .filter(|a| filter.author_id.map_or(true, |id| a.author_id == id))
            .filter(|a| filter.slug.as_ref().map_or(true, |s| &a.slug == s))
            .filter(|a| filter.title.as_ref().map_or(true, |t| &a.title == t))
            .filter(|a| author_by_name.map_or(true, |id| id == Some(a.author_id)))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let mut rows = page(rows, filter.limit, filter.offset);
        for article in rows.iter_mut() {
            let author = tables
                .users
                .iter()
                .find(|u| u.id == article.author_id)
                .cloned()
                .ok_or(DatabaseError::NotFound)?;
            article.author = Some(author);
        }
        Ok(rows)
    }

    async fn update_article(
        &self,
        article: &mut Article,
        patch: ArticlePatch,
    ) -> Result<(), DatabaseError> {
        let mut tables = self.tables.lock().unwrap();
        patch.apply(article);

        let row = tables
            .articles
            .iter_mut()
            .find(|a| a.id == article.id)
            .ok_or(DatabaseError::Storage)?;
        article.updated_at = Utc::now();
        row.title = article.title.clone();
        row.body = article.body.clone();
        row.updated_at = article.updated_at;
        Ok(())
    }

    async fn delete_article(&self, id: i64) -> Result<(), DatabaseError> {
        self.tables.lock().unwrap().articles.retain(|a| a.id != id);
        Ok(())
    }
}

pub fn test_state(store: &InMemoryStore) -> AppState {
    AppState::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        TokenIssuer::new(TEST_SECRET, 24),
        MIN_BCRYPT_COST,
    )
}

pub fn test_app(store: &InMemoryStore) -> Router {
    let security = SecurityConfig {
        jwt_secret: TEST_SECRET.to_string(),
        jwt_expiry_hours: 24,
        bcrypt_cost: MIN_BCRYPT_COST,
        cors_origins: vec!["*".to_string()],
    };
    app(test_state(store), &security)
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

/// Drive one request through `app`; an empty body decodes as `Value::Null`.
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> TestResponse {
    send_raw(app, method, uri, token, body.map(|json| json.to_string())).await
}

pub async fn send_raw(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<String>,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Token {}", token));
    }
    let request = match body {
        Some(raw) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(raw))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    TestResponse { status, headers, body }
}
