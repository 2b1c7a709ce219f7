//! Portico CMS Kernel
//!
//! HTTP server for the content front end.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use portico_kernel::config::Config;
use portico_kernel::models::Item;
use portico_kernel::routes;
use portico_kernel::session;
use portico_kernel::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing();

    info!("Starting Portico CMS kernel");

    let config = Config::from_env().context("failed to load configuration")?;
    info!(port = config.port, "Configuration loaded");

    let state =
        AppState::new(&config, demo_items()).context("failed to initialize application state")?;

    let same_site = session::same_site(&config.cookie_same_site);
    let app = routes::router(state);
    let app = match &config.redis_url {
        Some(redis_url) => {
            let layer = session::redis_session_layer(redis_url, same_site, config.cookie_secure)
                .await
                .context("failed to create session layer")?;
            info!("Sessions stored in Redis");
            app.layer(layer)
        }
        None => {
            info!("Sessions stored in memory");
            app.layer(session::memory_session_layer(same_site, config.cookie_secure))
        }
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "Listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

    info!("Server stopped");
    Ok(())
}

/// Sample content so a fresh install has something to page through.
fn demo_items() -> Vec<Item> {
    (1..=42)
        .map(|n| Item::new(format!("Item {n}"), format!("Body of item {n}.")))
        .collect()
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
