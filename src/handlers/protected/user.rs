// handlers/protected/user.rs - the authenticated caller's own account
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;

use crate::auth::password::hash_password;
use crate::database::models::{User, UserPatch};
use crate::handlers::public::users::UserEnvelope;
use crate::handlers::validation::FieldErrors;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// GET /api/v1/user
pub async fn get_current_user(CurrentUser { mut user, token }: CurrentUser) -> ApiResult<User> {
    user.token = Some(token);
    Ok(ApiResponse::success("user", user))
}

/// PUT|PATCH /api/v1/user - change username and/or password
///
/// Tokens carry the username, so a rename answers with a freshly issued token;
/// the token used for this request stops resolving once the rename commits.
pub async fn update_user(
    State(state): State<AppState>,
    CurrentUser { mut user, token }: CurrentUser,
    payload: Result<Json<UserEnvelope<UserUpdate>>, JsonRejection>,
) -> ApiResult<User> {
    let Json(UserEnvelope { user: input }) = payload?;

    let mut errors = FieldErrors::new();
    if let Some(username) = input.username.as_deref() {
        errors.username(username);
    }
    if let Some(password) = input.password.as_deref() {
        errors.password(password);
    }
    errors.into_result()?;

    let password_hash = match input.password.as_deref() {
        Some(password) => Some(hash_password(password, state.password_cost)?),
        None => None,
    };
    let renamed = input
        .username
        .as_ref()
        .is_some_and(|username| *username != user.username);
    let patch = UserPatch {
        username: input.username,
        password_hash,
    };

    state.users.update_user(&mut user, patch).await?;

    user.token = Some(if renamed {
        state.tokens.issue(&user)?
    } else {
        token
    });
    Ok(ApiResponse::success("user", user))
}
