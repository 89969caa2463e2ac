use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;

use crate::auth::TokenIssuer;
use crate::config::AppConfig;
use crate::database::{DatabaseManager, PgArticleService, PgUserService};
use crate::routes::app;
use crate::state::AppState;

pub async fn handle(config: AppConfig, migrate: bool) -> anyhow::Result<()> {
    let pool = DatabaseManager::connect(&config.database).await?;
    DatabaseManager::health_check(&pool)
        .await
        .context("database is not reachable")?;

    if migrate {
        DatabaseManager::migrate(&pool).await?;
        tracing::info!("migrations applied");
    }

    let state = AppState::new(
        Arc::new(PgUserService::new(pool.clone())),
        Arc::new(PgArticleService::new(pool.clone())),
        TokenIssuer::new(config.security.jwt_secret.clone(), config.security.jwt_expiry_hours),
        config.security.bcrypt_cost,
    );
    let router = app(state, &config.security);

    let bind_addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("techblog-api listening on http://{}", bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    pool.close().await;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("shutdown signal received");
}
