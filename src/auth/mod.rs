pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::User;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    /// Unique per issued token
    pub jti: Uuid,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("JWT signing error: {0}")]
    Signing(String),

    #[error("invalid JWT: {0}")]
    Invalid(String),
}

/// Issues and verifies HS256 bearer tokens.
///
/// Tokens are stateless: there is no revocation list, a token stays valid
/// until `exp`.
pub struct TokenIssuer {
    secret: String,
    expiry_hours: u64,
}

impl TokenIssuer {
    pub fn new(secret: impl Into<String>, expiry_hours: u64) -> Self {
        Self {
            secret: secret.into(),
            expiry_hours,
        }
    }

    pub fn expiry_hours(&self) -> u64 {
        self.expiry_hours
    }

    pub fn issue(&self, user: &User) -> Result<String, TokenError> {
        if self.secret.is_empty() {
            return Err(TokenError::Signing("empty secret".to_string()));
        }

        let now = Utc::now();
        let exp = i64::try_from(self.expiry_hours)
            .ok()
            .and_then(Duration::try_hours)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                TokenError::Signing(format!(
                    "expiry of {} hours is out of range",
                    self.expiry_hours
                ))
            })?;
        let claims = Claims {
            sub: user.username.clone(),
            username: user.username.clone(),
            jti: Uuid::new_v4(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Fails on a bad signature, a malformed token or an expired one.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        if self.secret.is_empty() {
            return Err(TokenError::Invalid("no verification secret".to_string()));
        }

        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| TokenError::Invalid(e.to_string()))?;

        Ok(decoded.claims)
    }
}
