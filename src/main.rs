use std::sync::Arc;

use academia_billing::api::{AppState, create_router};
use academia_billing::clock::SystemClock;
use academia_billing::config::ConfigLoader;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_DIR: &str = "./config/estudio";
const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let config_dir =
        std::env::var("ACADEMIA_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_DIR.to_string());
    let listen_addr =
        std::env::var("LISTEN_ADDR").unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_string());

    let config = ConfigLoader::load(&config_dir)?;
    let state = AppState::from_config(&config, Arc::new(SystemClock))?;
    tracing::info!(
        config_dir = %config_dir,
        organization = %config.organization().id,
        "configuration loaded"
    );

    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    tracing::info!(addr = %listen_addr, "billing API listening");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await?;

    Ok(())
}
