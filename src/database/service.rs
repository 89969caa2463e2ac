use async_trait::async_trait;

use crate::database::manager::DatabaseError;
use crate::database::models::{Article, ArticleFilter, ArticlePatch, User, UserFilter, UserPatch};

/// User persistence. Each call runs in its own transaction.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Insert `user`, filling in its id and timestamps.
    async fn create_user(&self, user: &mut User) -> Result<(), DatabaseError>;

    async fn users(&self, filter: UserFilter) -> Result<Vec<User>, DatabaseError>;

    async fn user_by_id(&self, id: i64) -> Result<User, DatabaseError> {
        first_or_not_found(self.users(UserFilter::by_id(id)).await?)
    }

    async fn user_by_username(&self, username: &str) -> Result<User, DatabaseError> {
        first_or_not_found(self.users(UserFilter::by_username(username)).await?)
    }

    /// `NotFound` for an unknown username, `Unauthorized` for a bad password.
    async fn authenticate(&self, username: &str, password: &str) -> Result<User, DatabaseError> {
        let user = self.user_by_username(username).await?;
        if !user.verify_password(password) {
            return Err(DatabaseError::Unauthorized);
        }
        Ok(user)
    }

    /// Apply `patch` to `user`, persist it and refresh `updated_at`.
    async fn update_user(&self, user: &mut User, patch: UserPatch) -> Result<(), DatabaseError>;
}

/// Article persistence. Each call runs in its own transaction.
#[async_trait]
pub trait ArticleService: Send + Sync {
    /// Insert `article`, filling in its id and timestamps.
    async fn create_article(&self, article: &mut Article) -> Result<(), DatabaseError>;

    /// Newest first, each with its author resolved.
    async fn articles(&self, filter: ArticleFilter) -> Result<Vec<Article>, DatabaseError>;

    async fn article_by_slug(&self, slug: &str) -> Result<Article, DatabaseError> {
        first_or_not_found(self.articles(ArticleFilter::by_slug(slug)).await?)
    }

    /// Apply `patch` to `article`, persist it and refresh `updated_at`.
    async fn update_article(
        &self,
        article: &mut Article,
        patch: ArticlePatch,
    ) -> Result<(), DatabaseError>;

    /// Deleting an id that no longer exists is not an error.
    async fn delete_article(&self, id: i64) -> Result<(), DatabaseError>;
}

pub(crate) fn first_or_not_found<T>(rows: Vec<T>) -> Result<T, DatabaseError> {
    rows.into_iter().next().ok_or(DatabaseError::NotFound)
}
