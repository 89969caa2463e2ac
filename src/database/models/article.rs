use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use sqlx::FromRow;

use super::user::User;

#[derive(Debug, Clone, Default, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(skip)]
    pub id: i64,
    pub title: String,
    pub body: String,
    pub slug: String,
    #[serde(skip)]
    pub author_id: i64,
    /// Resolved from `author_id` whenever the article is read back
    #[sqlx(skip)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<User>,
    #[serde(serialize_with = "serialize_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "serialize_timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Article {
    pub fn new(
        title: impl Into<String>,
        body: impl Into<String>,
        slug: impl Into<String>,
        author: &User,
    ) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            slug: slug.into(),
            author_id: author.id,
            author: Some(author.clone()),
            ..Default::default()
        }
    }

    pub fn is_authored_by(&self, user: &User) -> bool {
        self.author_id == user.id
    }
}

/// Second-precision UTC, e.g. `2024-03-01T09:30:00Z`
fn serialize_timestamp<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&ts.format("%Y-%m-%dT%H:%M:%SZ").to_string())
}

#[derive(Debug, Clone, Default)]
pub struct ArticleFilter {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub author_id: Option<i64>,
    pub author_username: Option<String>,
    pub slug: Option<String>,

    pub limit: i64,
    pub offset: i64,
}

impl ArticleFilter {
    pub fn by_slug(slug: impl Into<String>) -> Self {
        Self {
            slug: Some(slug.into()),
            ..Default::default()
        }
    }

    pub fn by_author(username: impl Into<String>) -> Self {
        Self {
            author_username: Some(username.into()),
            ..Default::default()
        }
    }
}

/// Partial update; the slug and author are immutable.
#[derive(Debug, Clone, Default)]
pub struct ArticlePatch {
    pub title: Option<String>,
    pub body: Option<String>,
}

impl ArticlePatch {
    pub fn apply(self, article: &mut Article) {
        if let Some(v) = self.title {
            article.title = v;
        }
        if let Some(v) = self.body {
            article.body = v;
        }
    }
}
