//! Storefront server.
//!
//! # Usage
//!
//! ```bash
//! BACKEND_URL=http://localhost:5000 SESSION_SECRET=... cargo run --bin storefront
//! ```

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use verdant_storefront::{from_config, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,verdant_storefront=debug,verdant_auth=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    tracing::info!(
        backend = %config.backend.url,
        role_source = ?config.session.role_source,
        "Configuration loaded"
    );
    if config.session.uses_dev_secret() {
        tracing::warn!("SESSION_SECRET is not set; using the development secret");
    }

    let app = from_config(&config)?;
    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(%address, "Storefront listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "Failed to listen for shutdown signal");
    }
}
