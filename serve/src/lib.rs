//! HTTP API for the Saathi dashboard (axum + json).
//!
//! Routes: `/api/chat` (conversational advisor), `/api/weather`, `/api/news`,
//! `/api/prices` (cached external lookups), `/api/produce` (marketplace listings),
//! `/api/field-config` (simulator YAML generator).
//!
//! **Public API**: [`run_serve`], [`run_serve_on_listener`], [`AppState`].

mod app;
mod chat;
mod field_config;
mod lookups;
mod produce;
mod session;

pub use app::{router, AppState, LookupClients};
pub use produce::{NewListing, ProduceListing, ProduceStore, SqliteProduceStore, StoreError};

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

const DEFAULT_ADDR: &str = "127.0.0.1:8000";

/// Runs the server on an existing listener. Used by tests (bind to 127.0.0.1:0 then
/// pass the listener in together with a state built around a mock model).
pub async fn run_serve_on_listener(
    listener: TcpListener,
    state: Arc<AppState>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr = listener.local_addr()?;
    info!("api server listening on http://{}", addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

/// Runs the server. Listens on `addr` (default 127.0.0.1:8000).
pub async fn run_serve(
    addr: Option<&str>,
    state: Arc<AppState>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr = addr.unwrap_or(DEFAULT_ADDR);
    let listener = TcpListener::bind(addr).await?;
    run_serve_on_listener(listener, state).await
}
