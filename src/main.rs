use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use hostel_admin_api::config::{config, AppConfig};
use hostel_admin_api::database::DatabaseManager;
use hostel_admin_api::is_production;
use hostel_admin_api::media::CloudinaryMedia;
use hostel_admin_api::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, APP_PASSWORD_HASH, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config: AppConfig = config().clone();
    tracing::info!("Starting Hostel Admin API in {:?} mode", config.environment);

    if is_production!() && config.uses_default_session_secret() {
        tracing::warn!("SESSION_SECRET is not set; sessions are signed with the development secret");
    }
    if config.security.password_hash.is_none() {
        tracing::warn!("APP_PASSWORD_HASH is not set; dashboard login will fail");
    }

    let store = DatabaseManager::connect(&config)
        .await
        .context("failed to connect to the document store")?;
    let media = CloudinaryMedia::new(&config.media);
    if !media.is_configured() {
        tracing::warn!("Cloudinary credentials missing; uploads will answer 503");
    }

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(store, Arc::new(media), config);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Hostel Admin API listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await.context("server error")?;
    Ok(())
}
