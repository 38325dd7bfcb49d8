//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize subsystems in dependency order (store, fetcher, notifier, routes)
//! - Bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal, including a bad route table
//! - Subsystems initialize in order, not concurrently
//! - Listeners start last (traffic only when ready)

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::api::{self, ApiState, HttpTrackSource, TrackSource};
use crate::config::AppConfig;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::notify::WebhookDispatcher;
use crate::routing::RouteError;
use crate::store::{MemoryStore, Store};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid route table: {0}")]
    Routes(#[from] RouteError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Build the server with an in-memory store and HTTP track fetching.
pub fn build_server(config: AppConfig) -> Result<HttpServer, StartupError> {
    let source = HttpTrackSource::new(Duration::from_secs(config.timeouts.fetch_secs))?;
    build_server_with(config, Arc::new(MemoryStore::new()), Arc::new(source))
}

/// Build the server around the given store and track source.
pub fn build_server_with(
    config: AppConfig,
    store: Arc<dyn Store>,
    source: Arc<dyn TrackSource>,
) -> Result<HttpServer, StartupError> {
    let notifier = Arc::new(WebhookDispatcher::new(store.clone(), &config.webhooks)?);
    let state = Arc::new(ApiState::new(&config, store, source, notifier));
    let router = api::build_router(&config, state)?;

    tracing::info!(
        routes = router.routes().len(),
        root_path = %config.api.root_path,
        admin_path = %config.api.admin_path,
        "Routes compiled"
    );

    Ok(HttpServer::new(config, router))
}

/// Bind the configured address and serve until shutdown.
pub async fn run(config: AppConfig, shutdown: &Shutdown) -> Result<(), StartupError> {
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = build_server(config)?;
    server.run(listener, shutdown.subscribe()).await?;
    Ok(())
}
