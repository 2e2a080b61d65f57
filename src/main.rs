use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use projectmanager_api::{api, config::Config, db, AppState, CredentialService, FileStorage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    let config = Config::from_env().context("Invalid configuration")?;

    // RUST_LOG wins; LOG_LEVEL is the fallback default directive
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if config.uses_dev_secret() {
        tracing::warn!("JWT_SECRET not set, using the development secret");
    }

    // Schema bootstrap happens inside connect; a failure here aborts startup
    let store = db::connect(config.database_url.as_deref(), &config.pool)
        .await
        .context("Failed to initialize record store")?;
    tracing::info!(backend = store.backend_name(), environment = %config.environment, "Record store ready");

    let credentials = CredentialService::new(
        config.jwt_secret.as_bytes(),
        config.token_ttl,
        config.bcrypt_cost,
    );

    let files = FileStorage::init(&config.upload_folder, config.max_file_size)
        .await
        .with_context(|| format!("Failed to create upload folder {:?}", config.upload_folder))?;

    let state = Arc::new(AppState {
        store,
        credentials,
        files,
    });

    let app = api::router(state).layer(api::cors_layer(&config.allowed_origins)?);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!("API listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}
