//! Inferscope Web Server
//!
//! Run with: cargo run -p inferscope-web

use tracing::info;
use tracing_subscriber::EnvFilter;

use inferscope_web::{config::Config, router::build_router, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    // Initialise structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting Inferscope Web Server...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = Config::load()?;
    let bind = config.server.bind.clone();

    let state = AppState::from_config(config)?;
    info!("Backend API: {}", state.backend.base_url());

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!("🚀 Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
