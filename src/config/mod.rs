use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

use crate::auth::password::{MAX_BCRYPT_COST, MIN_BCRYPT_COST};

/// Upper bound for JWT_EXPIRY_HOURS: one year
const MAX_JWT_EXPIRY_HOURS: u64 = 24 * 365;

/// Secret used when JWT_SECRET is unset outside production.
const DEVELOPMENT_JWT_SECRET: &str = "techblog-development-secret";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(skip_serializing)]
    pub url: String,
    pub max_connections: u32,
    /// Seconds to wait when acquiring a pooled connection.
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub bcrypt_cost: u32,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    /// Build configuration from the process environment.
    ///
    /// `PORT` and `DATABASE_URL` are required; everything else falls back to
    /// per-environment defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`AppConfig::from_env`] but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let port = lookup("PORT").ok_or(ConfigError::Missing("PORT"))?;
        let port = parse("PORT", &port)?;

        let url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;
        url::Url::parse(&url).map_err(|_| ConfigError::Invalid {
            name: "DATABASE_URL",
            value: crate::database::manager::redact_url(&url),
        })?;

        let jwt_secret = match lookup("JWT_SECRET").filter(|v| !v.is_empty()) {
            Some(secret) => secret,
            None if environment == Environment::Production => {
                return Err(ConfigError::Missing("JWT_SECRET"))
            }
            None => {
                tracing::warn!("JWT_SECRET not set, using the development signing secret");
                DEVELOPMENT_JWT_SECRET.to_string()
            }
        };

        let mut config = Self::defaults(environment, port, url, jwt_secret);
        config.apply_overrides(&lookup)?;
        Ok(config)
    }

    fn apply_overrides<F>(&mut self, lookup: &F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse("DATABASE_MAX_CONNECTIONS", &v)?;
        }
        if let Some(v) = lookup("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = parse("DATABASE_CONNECTION_TIMEOUT", &v)?;
        }
        if let Some(v) = lookup("JWT_EXPIRY_HOURS") {
            let hours: u64 = parse("JWT_EXPIRY_HOURS", &v)?;
            if !(1..=MAX_JWT_EXPIRY_HOURS).contains(&hours) {
                return Err(ConfigError::Invalid { name: "JWT_EXPIRY_HOURS", value: v });
            }
            self.security.jwt_expiry_hours = hours;
        }
        if let Some(v) = lookup("SECURITY_BCRYPT_COST") {
            let cost: u32 = parse("SECURITY_BCRYPT_COST", &v)?;
            if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
                return Err(ConfigError::Invalid { name: "SECURITY_BCRYPT_COST", value: v });
            }
            self.security.bcrypt_cost = cost;
        }
        if let Some(v) = lookup("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        Ok(())
    }

    fn defaults(environment: Environment, port: u16, url: String, jwt_secret: String) -> Self {
        let (max_connections, connection_timeout, jwt_expiry_hours, cors_origins) =
            match environment {
                Environment::Development => (10, 30, 24 * 7, vec!["*".to_string()]),
                Environment::Staging => {
                    (20, 10, 24, vec!["https://staging.example.com".to_string()])
                }
                Environment::Production => {
                    (50, 5, 24, vec!["https://app.example.com".to_string()])
                }
            };

        Self {
            environment,
            server: ServerConfig { port },
            database: DatabaseConfig {
                url,
                max_connections,
                connection_timeout,
            },
            security: SecurityConfig {
                jwt_secret,
                jwt_expiry_hours,
                bcrypt_cost: bcrypt::DEFAULT_COST,
                cors_origins,
            },
        }
    }
}

fn parse<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
    })
}
