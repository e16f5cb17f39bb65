//! HTTP server setup and routing

use crate::altimeter::Altimeter;
use crate::error::{Error, Result};
use crate::ingest::Ingestor;
use crate::state::AircraftStore;
use crate::stream::Publisher;
use axum::{extract::DefaultBodyLimit, routing::get, Router};
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct AppContext {
    pub store: Arc<AircraftStore>,
    pub ingestor: Arc<Ingestor>,
    pub altimeter: Arc<Altimeter>,
    pub publisher: Arc<Publisher>,
    /// Fires on shutdown; every stream publisher watches it
    pub cancel: CancellationToken,
}

/// Build the router
///
/// Bodies larger than `max_batch_bytes` are never buffered; the ingestion
/// handler sees the rejection and drops the batch.
pub fn create_router(ctx: AppContext, max_batch_bytes: usize) -> Router {
    Router::new()
        // Health endpoint
        .route("/health", get(super::handlers::health))
        // Ingestion (POST) and egress stream (GET)
        .route(
            "/updates",
            get(super::handlers::stream_updates).post(super::handlers::ingest_updates),
        )
        .with_state(ctx)
        .layer(DefaultBodyLimit::max(max_batch_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Serve `app` on `bind_address:port` until `shutdown` resolves
pub async fn run<F>(bind_address: &str, port: u16, app: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = format!("{}:{}", bind_address, port);
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| Error::Http(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| Error::Http(format!("Server error: {}", e)))?;

    Ok(())
}

/// Resolves once shutdown is under way, cancelling `cancel` on the way out
///
/// Either `signal` completes or something else cancels the token first (a
/// fatal task, a test). Both paths leave the token cancelled so every stream
/// publisher stops before the server drains.
pub async fn shutdown_when<F>(signal: F, cancel: CancellationToken)
where
    F: Future<Output = ()>,
{
    tokio::select! {
        _ = signal => info!("Shutdown requested"),
        _ = cancel.cancelled() => warn!("Shutting down after internal cancellation"),
    }
    cancel.cancel();
}
