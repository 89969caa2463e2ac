use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::database::models::User;
use crate::error::ApiError;
use crate::state::AppState;

/// Who is making the request.
///
/// Optionally authenticated routes see `Anonymous` when no `Authorization`
/// header was sent; required routes never do.
#[derive(Clone, Debug)]
pub enum Identity {
    Authenticated(User),
    Anonymous,
}

impl Identity {
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Identity::Anonymous)
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Identity::Authenticated(user) => Some(user),
            Identity::Anonymous => None,
        }
    }
}

/// Raw token the caller authenticated with, echoed back in user responses
#[derive(Clone, Debug)]
pub struct BearerToken(pub String);

/// Reject requests without a valid bearer token
pub async fn require_auth(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Response {
    with_vary(authenticate(&state, &headers, request, next, true).await)
}

/// Treat a missing `Authorization` header as an anonymous caller
pub async fn optional_auth(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Response {
    with_vary(authenticate(&state, &headers, request, next, false).await)
}

async fn authenticate(
    state: &AppState,
    headers: &HeaderMap,
    mut request: Request,
    next: Next,
    required: bool,
) -> Result<Response, ApiError> {
    match extract_token_from_headers(headers)? {
        None if required => return Err(ApiError::InvalidAuthToken),
        None => {
            request.extensions_mut().insert(Identity::Anonymous);
        }
        Some(token) => {
            let claims = state.tokens.verify(&token)?;

            // A validly signed token for a user that no longer resolves is server-side drift
            let user = state
                .users
                .user_by_username(&claims.username)
                .await
                .map_err(|e| {
                    ApiError::internal_server_error(format!(
                        "cannot resolve token user {}: {}",
                        claims.username, e
                    ))
                })?;

            tracing::debug!("authenticated request as {}", user.username);
            request.extensions_mut().insert(Identity::Authenticated(user));
            request.extensions_mut().insert(BearerToken(token));
        }
    }

    Ok(next.run(request).await)
}

/// Responses depend on the caller, rejections included
fn with_vary(result: Result<Response, ApiError>) -> Response {
    let mut response = result.unwrap_or_else(IntoResponse::into_response);
    response
        .headers_mut()
        .append(header::VARY, HeaderValue::from_static("authorization"));
    response
}

/// Pull the token out of `Authorization: <Bearer|Token> <token>`.
///
/// `Ok(None)` when the header is absent; any other shape is an error.
fn extract_token_from_headers(headers: &HeaderMap) -> Result<Option<String>, ApiError> {
    let Some(auth_header) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::InvalidAuthToken)?;

    let parts: Vec<&str> = auth_str.split_whitespace().collect();
    match parts.as_slice() {
        [scheme, token]
            if scheme.eq_ignore_ascii_case("bearer") || scheme.eq_ignore_ascii_case("token") =>
        {
            Ok(Some((*token).to_string()))
        }
        _ => Err(ApiError::InvalidAuthToken),
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<Identity>()
            .cloned()
            .unwrap_or(Identity::Anonymous))
    }
}

/// The authenticated caller and the token they presented
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub user: User,
    pub token: String,
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Identity>() {
            Some(Identity::Authenticated(user)) => user.clone(),
            _ => return Err(ApiError::InvalidAuthToken),
        };
        let token = parts
            .extensions
            .get::<BearerToken>()
            .map(|t| t.0.clone())
            .unwrap_or_default();

        Ok(CurrentUser { user, token })
    }
}
