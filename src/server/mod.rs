//! Host HTTP server.
//!
//! Mounts the decompression middleware in front of an echo endpoint and
//! exposes its statistics:
//! - `GET /health` - liveness
//! - `GET /stats` - decompression statistics (JSON)
//! - `POST /stats/reset` - zero the statistics
//! - `POST /echo` - returns the decoded request body
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use request_decompress::server::{create_router, serve, AppState, ServerConfig};
//!
//! let config = ServerConfig::default().with_port(8080);
//! let state = Arc::new(AppState::new(config.clone()));
//! serve(config.addr, create_router(state)).await?;
//! ```

mod config;
mod handlers;
mod state;

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;

pub use config::ServerConfig;
pub use handlers::{
    create_router, health_check, X_BODY_LENGTH, X_DECODED_FROM, X_REQUEST_CONTENT_LENGTH,
};
pub use state::AppState;

use crate::error::{DecompressError, Result};

/// Bind `addr` and serve `router` until the listener fails.
pub async fn serve(addr: SocketAddr, router: Router) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| DecompressError::Server(format!("Failed to bind TCP to {}: {}", addr, e)))?;

    serve_listener(listener, router).await
}

/// Serve `router` on an already bound listener.
pub async fn serve_listener(listener: TcpListener, router: Router) -> Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Listening on http://{}", addr);
    }

    axum::serve(listener, router)
        .await
        .map_err(|e| DecompressError::Server(format!("TCP server error: {}", e)))
}
