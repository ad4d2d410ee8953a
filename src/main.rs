use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::http::{HeaderValue, Method, header};
use time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

mod clock;
mod config;
mod data;
mod db;
mod features;
mod handlers;
mod schema;
mod utils;
mod workers;

use clock::{Clock, SystemClock};
use config::AppConfig;
use db::DbPool;
use workers::{OrphanCleaner, start_job};

/// Shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub clock: Arc<dyn Clock>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env()?;

    // Database configuration
    let pool = db::build_pool(&config.database_url)
        .with_context(|| format!("failed to open database {}", config.database_url))?;
    {
        let mut conn = pool.get()?;
        db::init_schema(&mut conn).context("failed to create schema")?;
    }

    // Orphan card cleaner
    let cleaner = start_job(
        Arc::new(OrphanCleaner::new(pool.clone(), &config.cleaner)),
        config.cleaner.interval,
    );
    if config.cleaner.run_on_start {
        cleaner.run_now();
    }

    // Sessions configuration
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_expiry(Expiry::OnInactivity(Duration::days(1)))
        .with_secure(config.secure_cookies);

    let cors = CorsLayer::new()
        .allow_origin(
            config
                .cors_origin
                .parse::<HeaderValue>()
                .with_context(|| format!("invalid CORS_ORIGIN {}", config.cors_origin))?,
        )
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    let state = AppState {
        pool,
        clock: Arc::new(SystemClock),
    };

    let app = Router::new()
        .nest("/api", handlers::api_router())
        .layer(session_layer)
        .layer(cors)
        .with_state(state);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;
    log::info!("Server running on http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    cleaner.shutdown().await;
    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown signal received");
}
