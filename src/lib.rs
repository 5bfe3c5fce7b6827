//! # request-decompress - Transparent request body decompression
//!
//! HTTP middleware that decodes compressed request bodies before they reach
//! the handlers that consume them. Clients announce the compression with the
//! `Content-Encoding` header; the middleware decodes the body in memory,
//! removes the header, rewrites `Content-Length`, and forwards the request.
//!
//! ## Features
//!
//! - **Closed encoding set**: gzip, bzip2 (`bz2`), zstd, and opt-in brotli (`br`)
//! - **Strict rejection**: unknown tokens and corrupt bodies answer `400 Bad Request`
//! - **Bounded memory**: limits on both the compressed and the decoded size
//! - **Statistics**: per-instance counters, per-token breakdown, decode latency
//!
//! ## Request Flow
//!
//! ```text
//! Client                     Decompressor                    Handler
//!    |                            |                             |
//!    |-- POST (gzip body) ------->|                             |
//!    |                            |-- buffer + decode           |
//!    |                            |-- strip Content-Encoding    |
//!    |                            |-- POST (plain body) ------->|
//!    |<----------------------------------------- response ------|
//!    |                            |                             |
//!    |-- POST (Content-Encoding: lz4) -->|                      |
//!    |<-- 400 unsupported --------|                             |
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use axum::{routing::post, Router};
//! use request_decompress::{with_request_decompression, DecompressionConfig, RequestDecompressor};
//!
//! let decompressor = Arc::new(RequestDecompressor::new(DecompressionConfig::default()));
//! let app = with_request_decompression(
//!     Router::new().route("/ingest", post(|body: String| async move { body })),
//!     decompressor.clone(),
//! );
//! ```
//!
//! ## Modules
//!
//! - [`codec`]: Encoding tokens and decoders
//! - [`middleware`]: The decompressor, its statistics, and axum glue
//! - [`server`]: Host HTTP server (Axum-based)
//! - [`config`]: Configuration management
//! - [`error`]: Error types and result aliases

pub mod codec;
pub mod config;
pub mod error;
pub mod middleware;
pub mod server;

// Re-exports for convenience
pub use codec::Encoding;
pub use config::{Config, DecompressionConfig};
pub use error::{DecompressError, Result};
pub use middleware::{
    decompress_request, with_request_decompression, DecodedBody, DecompressionStats,
    RequestDecompressor, RequestRecord, StatsSummary,
};
pub use server::{AppState, ServerConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
