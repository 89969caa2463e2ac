use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};

use crate::database::manager::{unique_violation, DatabaseError};
use crate::database::models::{User, UserFilter, UserPatch};
use crate::database::query_builder::{limit_offset, WhereBuilder};
use crate::database::service::{first_or_not_found, UserService};

const USERNAME_CONSTRAINT: &str = "users_username_key";

const USER_COLUMNS: &str = "id, username, password_hash, created_at, updated_at";

/// Postgres-backed [`UserService`]
#[derive(Clone)]
pub struct PgUserService {
    pool: PgPool,
}

impl PgUserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserService for PgUserService {
    async fn create_user(&self, user: &mut User) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        insert_user(&mut *tx, user).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn users(&self, filter: UserFilter) -> Result<Vec<User>, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let users = find_users(&mut *tx, &filter).await?;
        tx.commit().await?;
        Ok(users)
    }

    async fn update_user(&self, user: &mut User, patch: UserPatch) -> Result<(), DatabaseError> {
        let result = async {
            let mut tx = self.pool.begin().await?;
            write_user(&mut *tx, user, patch).await?;
            tx.commit().await?;
            Ok::<_, DatabaseError>(())
        }
        .await;

        result.map_err(|e| match e {
            DatabaseError::DuplicateUsername => e,
            other => {
                tracing::error!("error updating user {}: {}", user.id, other);
                DatabaseError::Storage
            }
        })
    }
}

async fn insert_user(conn: &mut PgConnection, user: &mut User) -> Result<(), DatabaseError> {
    let row: (i64, chrono::DateTime<chrono::Utc>, chrono::DateTime<chrono::Utc>) = sqlx::query_as(
        "INSERT INTO users (username, password_hash)
         VALUES ($1, $2)
         RETURNING id, created_at, updated_at",
    )
    .bind(&user.username)
    .bind(&user.password_hash)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| match unique_violation(&e) {
        Some(constraint) if constraint == USERNAME_CONSTRAINT => DatabaseError::DuplicateUsername,
        _ => DatabaseError::Sqlx(e),
    })?;

    (user.id, user.created_at, user.updated_at) = row;
    Ok(())
}

pub(crate) async fn find_users(
    conn: &mut PgConnection,
    filter: &UserFilter,
) -> Result<Vec<User>, DatabaseError> {
    let mut where_builder = WhereBuilder::new();
    where_builder.eq_opt("id", filter.id);
    where_builder.eq_opt("username", filter.username.as_deref());

    let sql = format!(
        "SELECT {} FROM users{} ORDER BY id ASC{}",
        USER_COLUMNS,
        where_builder.where_clause(),
        limit_offset(filter.limit, filter.offset)
    );

    let users = where_builder
        .bind(sqlx::query_as::<_, User>(&sql))
        .fetch_all(&mut *conn)
        .await?;
    Ok(users)
}

pub(crate) async fn find_user_by_id(
    conn: &mut PgConnection,
    id: i64,
) -> Result<User, DatabaseError> {
    first_or_not_found(find_users(conn, &UserFilter::by_id(id)).await?)
}

async fn write_user(
    conn: &mut PgConnection,
    user: &mut User,
    patch: UserPatch,
) -> Result<(), DatabaseError> {
    patch.apply(user);

    let (updated_at,): (chrono::DateTime<chrono::Utc>,) = sqlx::query_as(
        "UPDATE users
         SET username = $1, password_hash = $2, updated_at = NOW()
         WHERE id = $3
         RETURNING updated_at",
    )
    .bind(&user.username)
    .bind(&user.password_hash)
    .bind(user.id)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| match unique_violation(&e) {
        Some(constraint) if constraint == USERNAME_CONSTRAINT => DatabaseError::DuplicateUsername,
        _ => DatabaseError::Sqlx(e),
    })?;

    user.updated_at = updated_at;
    Ok(())
}
