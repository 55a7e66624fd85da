use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use super::api::{self, AppState};
use super::db::{DbHandle, IntakeDb};
use super::service::CompletionService;
use super::store::SqliteStore;
use crate::config::AppConfig;

/// Build the full application router.
pub fn build_router(state: Arc<AppState>, cors: bool) -> Router {
    let mut app = api::api_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if cors {
        app = app.layer(CorsLayer::permissive());
    }
    app
}

/// Open the configured database and wire the completion service to it.
pub fn open_state(config: &AppConfig) -> Result<Arc<AppState>> {
    if let Some(parent) = config.database.path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).context("Failed to create database directory")?;
    }

    let db = IntakeDb::new(
        &config.database.path,
        Duration::from_millis(config.database.busy_timeout_ms),
    )
    .context("Failed to initialize intake database")?;
    let store = SqliteStore::new(DbHandle::new(db));
    let service = CompletionService::new(Arc::new(store), config.messages.locale);

    Ok(Arc::new(AppState { service }))
}

/// Start the intake server.
pub async fn start_server(config: AppConfig) -> Result<()> {
    for warning in config.validate() {
        warn!("{}", warning);
    }

    let state = open_state(&config)?;
    info!(path = %config.database.path.display(), "Database ready");

    let app = build_router(state, config.api.cors);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    let local_addr = listener.local_addr()?;
    info!("Barcode intake API running at http://{}", local_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    info!("Shutting down...");
}
