#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};
use uuid::Uuid;

use techblog_api::auth::password::MIN_BCRYPT_COST;
use techblog_api::auth::TokenIssuer;
use techblog_api::config::{DatabaseConfig, SecurityConfig};
use techblog_api::database::{DatabaseManager, PgArticleService, PgUserService};
use techblog_api::{app, AppState};

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Serve the real router over Postgres on a free port.
    async fn spawn(database_url: String) -> Result<Self> {
        let database = DatabaseConfig {
            url: database_url,
            max_connections: 5,
            connection_timeout: 10,
        };
        let pool = DatabaseManager::connect(&database).await?;
        DatabaseManager::migrate(&pool).await?;

        let security = SecurityConfig {
            jwt_secret: "integration-secret".to_string(),
            jwt_expiry_hours: 1,
            bcrypt_cost: MIN_BCRYPT_COST,
            cors_origins: vec!["*".to_string()],
        };
        let state = AppState::new(
            Arc::new(PgUserService::new(pool.clone())),
            Arc::new(PgArticleService::new(pool)),
            TokenIssuer::new(security.jwt_secret.clone(), security.jwt_expiry_hours),
            security.bcrypt_cost,
        );
        let router = app(state, &security);

        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test port")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Ok(Self {
            port,
            base_url: format!("http://127.0.0.1:{}/api/v1", port),
            client: reqwest::Client::new(),
        })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Register a fresh user and log in, returning `(username, token)`.
    pub async fn signup(&self) -> Result<(String, String)> {
        let username = unique_username();
        let credentials = json!({ "user": { "username": username, "password": "password1" } });

        let resp = self.client.post(self.url("/users")).json(&credentials).send().await?;
        anyhow::ensure!(resp.status() == StatusCode::CREATED, "register failed: {}", resp.status());

        let resp = self.client.post(self.url("/users/login")).json(&credentials).send().await?;
        anyhow::ensure!(resp.status() == StatusCode::OK, "login failed: {}", resp.status());
        let body: Value = resp.json().await?;
        let token = body["user"]["token"]
            .as_str()
            .context("login response carries no token")?
            .to_string();

        Ok((username, token))
    }
}

pub fn unique_username() -> String {
    format!("user_{}", Uuid::new_v4().simple())
}

pub fn unique_slug() -> String {
    format!("post-{}", Uuid::new_v4().simple())
}

/// `None` when DATABASE_URL is unset, so suites skip instead of failing.
pub async fn ensure_server() -> Result<Option<TestServer>> {
    let _ = dotenvy::dotenv();
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping database integration test");
        return Ok(None);
    };

    let server = TestServer::spawn(database_url).await?;
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(Some(server))
}
