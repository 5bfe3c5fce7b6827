//! Request decompression middleware.
//!
//! Sits in front of handlers that consume the request body. For every
//! request carrying a `Content-Encoding` header it:
//!
//! 1. counts the request and its lower-cased encoding token,
//! 2. buffers the body (bounded by `max_body_size`),
//! 3. decodes it with the matching [`Encoding`](crate::codec::Encoding),
//! 4. swaps in the decoded body, drops `Content-Encoding` and
//!    `Transfer-Encoding`, and rewrites `Content-Length`,
//! 5. forwards the request, or answers `400 Bad Request` on any failure.
//!
//! Requests without the header pass through untouched and are not counted.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use axum::{routing::post, Router};
//! use request_decompress::middleware::{with_request_decompression, RequestDecompressor};
//!
//! let decompressor = Arc::new(RequestDecompressor::default());
//! let app = with_request_decompression(
//!     Router::new().route("/ingest", post(ingest)),
//!     decompressor.clone(),
//! );
//!
//! // later
//! println!("{:?}", decompressor.stats().summary());
//! ```

mod decompressor;
mod layer;
mod stats;

pub use decompressor::{content_encoding_token, DecodedBody, RequestDecompressor};
pub use layer::{decompress_request, with_request_decompression};
pub use stats::{DecompressionStats, RequestRecord, StatsSummary};
