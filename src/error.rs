// HTTP API Error Types
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::{header, HeaderValue, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::auth::password::{PasswordError, MAX_PASSWORD_BYTES};
use crate::auth::TokenError;
use crate::database::DatabaseError;

/// Body of the `errors` key: a plain message or per-field messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Message(String),
    Fields(BTreeMap<String, Vec<String>>),
}

impl ErrorDetail {
    pub fn message(message: impl Into<String>) -> Self {
        ErrorDetail::Message(message.into())
    }

    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(field.into(), vec![message.into()]);
        ErrorDetail::Fields(fields)
    }
}

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 401 Unauthorized
    Unauthorized(String),
    InvalidAuthToken,

    // 403 Forbidden
    Forbidden(ErrorDetail),

    // 404 Not Found
    NotFound(ErrorDetail),

    // 409 Conflict
    Conflict(ErrorDetail),

    // 422 Unprocessable Entity
    UnprocessableEntity(ErrorDetail),

    // 500 Internal Server Error; the message is logged, never returned
    InternalServerError(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) | ApiError::InvalidAuthToken => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-visible `errors` payload
    pub fn detail(&self) -> ErrorDetail {
        match self {
            ApiError::Unauthorized(msg) => ErrorDetail::message(msg.clone()),
            ApiError::InvalidAuthToken => {
                ErrorDetail::message("invalid or missing authentication token")
            }
            ApiError::Forbidden(detail)
            | ApiError::NotFound(detail)
            | ApiError::Conflict(detail)
            | ApiError::UnprocessableEntity(detail) => detail.clone(),
            ApiError::InternalServerError(_) => ErrorDetail::message("internal error"),
        }
    }

    pub fn to_json(&self) -> Value {
        json!({ "errors": self.detail() })
    }
}

impl ApiError {
    pub fn invalid_credentials() -> Self {
        ApiError::Unauthorized("invalid authentication credentials".to_string())
    }

    pub fn forbidden(field: &str, message: &str) -> Self {
        ApiError::Forbidden(ErrorDetail::field(field, message))
    }

    pub fn not_found(field: &str, message: &str) -> Self {
        ApiError::NotFound(ErrorDetail::field(field, message))
    }

    pub fn conflict(field: &str, message: &str) -> Self {
        ApiError::Conflict(ErrorDetail::field(field, message))
    }

    pub fn validation(fields: BTreeMap<String, Vec<String>>) -> Self {
        ApiError::UnprocessableEntity(ErrorDetail::Fields(fields))
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        ApiError::UnprocessableEntity(ErrorDetail::message(message))
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }
}

// Convert other error types to ApiError
impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound => {
                ApiError::NotFound(ErrorDetail::message("record not found"))
            }
            DatabaseError::DuplicateUsername => {
                ApiError::conflict("username", "this username is already in use")
            }
            DatabaseError::DuplicateSlug => {
                ApiError::conflict("slug", "this slug is already in use")
            }
            DatabaseError::Unauthorized => ApiError::invalid_credentials(),
            // Don't expose internal SQL errors to clients
            other => ApiError::internal_server_error(other.to_string()),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::TooLong => ApiError::UnprocessableEntity(ErrorDetail::field(
                "password",
                format!("password must be less than {}", MAX_PASSWORD_BYTES),
            )),
            other => ApiError::internal_server_error(other.to_string()),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid(_) => ApiError::InvalidAuthToken,
            TokenError::Signing(msg) => ApiError::internal_server_error(msg),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::unprocessable(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::unprocessable(rejection.body_text())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::InternalServerError(msg) => write!(f, "internal error: {}", msg),
            other => write!(f, "{}: {}", other.status_code(), other.to_json()),
        }
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        if let ApiError::InternalServerError(msg) = &self {
            tracing::error!("{}", msg);
        }

        let mut response = (self.status_code(), Json(self.to_json())).into_response();
        if matches!(self, ApiError::InvalidAuthToken) {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Token"));
        }
        response
    }
}
