// handlers/public/users.rs - registration and login
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;

use crate::database::models::User;
use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::handlers::validation::FieldErrors;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UserEnvelope<T> {
    pub user: T,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// POST /api/v1/users - register a new author
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<UserEnvelope<Credentials>>, JsonRejection>,
) -> ApiResult<User> {
    let Json(UserEnvelope { user: input }) = payload?;

    let mut errors = FieldErrors::new();
    errors.username(&input.username);
    errors.password(&input.password);
    errors.into_result()?;

    let mut user = User::new(input.username);
    user.set_password_with_cost(&input.password, state.password_cost)?;

    state.users.create_user(&mut user).await?;
    tracing::info!("registered user {} (id {})", user.username, user.id);

    Ok(ApiResponse::created("user", user))
}

/// POST /api/v1/users/login - exchange credentials for a bearer token
///
/// Unknown usernames and wrong passwords get the same 401.
pub async fn login_user(
    State(state): State<AppState>,
    payload: Result<Json<UserEnvelope<Credentials>>, JsonRejection>,
) -> ApiResult<User> {
    let Json(UserEnvelope { user: input }) = payload?;

    let mut user = match state
        .users
        .authenticate(&input.username, &input.password)
        .await
    {
        Ok(user) => user,
        Err(DatabaseError::NotFound | DatabaseError::Unauthorized) => {
            return Err(ApiError::invalid_credentials());
        }
        Err(e) => {
            tracing::error!("login for {} failed: {}", input.username, e);
            return Err(ApiError::invalid_credentials());
        }
    };

    user.token = Some(state.tokens.issue(&user)?);
    Ok(ApiResponse::success("user", user))
}
