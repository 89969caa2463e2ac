use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::auth::password::{self, PasswordError};

/// A registered author.
///
/// Only `username` and, when present, `token` are ever serialized; the hash,
/// id and timestamps stay server-side.
#[derive(Debug, Clone, Default, Serialize, FromRow)]
pub struct User {
    #[serde(skip)]
    pub id: i64,
    pub username: String,
    #[serde(skip)]
    pub password_hash: String,
    /// Bearer token handed back to the client; never persisted
    #[sqlx(skip)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Default::default()
        }
    }

    /// Hash `plain` at the default bcrypt cost and store it.
    pub fn set_password(&mut self, plain: &str) -> Result<(), PasswordError> {
        self.set_password_with_cost(plain, bcrypt::DEFAULT_COST)
    }

    pub fn set_password_with_cost(&mut self, plain: &str, cost: u32) -> Result<(), PasswordError> {
        self.password_hash = password::hash_password(plain, cost)?;
        Ok(())
    }

    /// False on any mismatch, including an empty or corrupt stored hash.
    pub fn verify_password(&self, plain: &str) -> bool {
        password::verify_password(plain, &self.password_hash)
    }
}

#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub id: Option<i64>,
    pub username: Option<String>,

    pub limit: i64,
    pub offset: i64,
}

impl UserFilter {
    pub fn by_id(id: i64) -> Self {
        Self {
            id: Some(id),
            ..Default::default()
        }
    }

    pub fn by_username(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            ..Default::default()
        }
    }
}

/// Partial update; `None` fields leave the user untouched.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub username: Option<String>,
    pub password_hash: Option<String>,
}

impl UserPatch {
    pub fn apply(self, user: &mut User) {
        if let Some(v) = self.username {
            user.username = v;
        }
        if let Some(v) = self.password_hash {
            user.password_hash = v;
        }
    }
}
