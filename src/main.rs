use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use soundshelf_api::{app, config::AppConfig, database, state::AppState};

#[derive(Debug, Parser)]
#[command(name = "soundshelf-api", version, about = "SoundShelf REST API server")]
struct Args {
    /// Interface to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so DATABASE_URL and SECURITY_* are picked up
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = AppConfig::from_env().context("invalid configuration")?;
    tracing::info!("Starting SoundShelf API in {:?} mode", config.environment);
    if config.is_development() {
        tracing::warn!("development profile active; do not use in production");
    }

    let store = database::connect(&config.database)
        .await
        .context("failed to open document store")?;
    let state = AppState::new(store.clone(), config);

    let bind_addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!("SoundShelf API listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    store.close().await;
    tracing::info!("SoundShelf API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("shutdown signal received");
}
