//! The request decompressor.
//!
//! Reads a request whose body is announced as compressed, decodes it in
//! memory and hands back a request that downstream handlers can read as if
//! it had been sent uncompressed.

use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::Request,
    http::{header, HeaderMap, HeaderValue},
};
use bytes::Bytes;
use http_body_util::{BodyExt, Limited};

use super::stats::DecompressionStats;
use crate::codec::Encoding;
use crate::config::DecompressionConfig;
use crate::error::{DecompressError, Result};

/// Request extension describing the body that was decoded.
///
/// Inserted into every request the decompressor forwards after decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedBody {
    /// Encoding the client used
    pub encoding: Encoding,
    /// Size of the body as received
    pub compressed_len: usize,
    /// Size of the body after decoding
    pub decoded_len: usize,
}

/// Decompresses request bodies according to their `Content-Encoding`.
///
/// One instance owns one [`DecompressionStats`]; share it behind an `Arc`.
#[derive(Debug)]
pub struct RequestDecompressor {
    config: DecompressionConfig,
    stats: DecompressionStats,
}

impl Default for RequestDecompressor {
    fn default() -> Self {
        Self::new(DecompressionConfig::default())
    }
}

impl RequestDecompressor {
    /// Create a decompressor with the given configuration
    pub fn new(config: DecompressionConfig) -> Self {
        Self {
            config,
            stats: DecompressionStats::new(),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &DecompressionConfig {
        &self.config
    }

    /// Get the statistics
    pub fn stats(&self) -> &DecompressionStats {
        &self.stats
    }

    /// Decode `body` according to a lower-cased `token`.
    ///
    /// Tokens that are unknown or not enabled fail with
    /// [`DecompressError::UnsupportedEncoding`]. Statistics are not touched.
    pub fn decode(&self, token: &str, body: &[u8]) -> Result<(Encoding, Vec<u8>)> {
        let encoding = Encoding::from_token(token)
            .filter(|encoding| self.config.is_enabled(*encoding))
            .ok_or_else(|| DecompressError::UnsupportedEncoding(token.to_string()))?;

        let decoded = encoding.decode(body, self.config.max_decoded_size)?;
        Ok((encoding, decoded))
    }

    /// Decompress the body of `request` if it carries a `Content-Encoding`.
    ///
    /// Requests without the header (or with an empty one) come back
    /// untouched and are not counted. Otherwise the returned request has a
    /// decoded body, no `Content-Encoding`, a matching `Content-Length`, and
    /// a [`DecodedBody`] extension.
    pub async fn process(&self, request: Request) -> Result<Request> {
        let Some(token) = content_encoding_token(request.headers()) else {
            return Ok(request);
        };

        let record = self.stats.record_request(&token);

        match self.decompress(&token, request).await {
            Ok((request, info, latency)) => {
                record.success(info.compressed_len, info.decoded_len, latency);
                Ok(request)
            },
            Err(e) => {
                record.failure();
                tracing::warn!(encoding = %token, error = %e, "Rejected compressed request body");
                Err(e)
            },
        }
    }

    async fn decompress(
        &self,
        token: &str,
        request: Request,
    ) -> Result<(Request, DecodedBody, Duration)> {
        let (mut parts, body) = request.into_parts();

        let compressed = read_body(body, self.config.max_body_size).await?;

        let start = Instant::now();
        let (encoding, decoded) = self.decode(token, &compressed)?;
        let latency = start.elapsed();

        tracing::debug!(
            encoding = %token,
            compressed = compressed.len(),
            decoded = decoded.len(),
            latency_us = latency.as_micros() as u64,
            "Decompressed request body"
        );

        let info = DecodedBody {
            encoding,
            compressed_len: compressed.len(),
            decoded_len: decoded.len(),
        };

        // The decoded body is fully buffered, so Content-Length is the only framing
        parts.headers.remove(header::CONTENT_ENCODING);
        parts.headers.remove(header::TRANSFER_ENCODING);
        parts
            .headers
            .insert(header::CONTENT_LENGTH, HeaderValue::from(decoded.len()));
        parts.extensions.insert(info);

        Ok((Request::from_parts(parts, Body::from(decoded)), info, latency))
    }
}

/// Extract the lower-cased `Content-Encoding` token.
///
/// Returns `None` when the header is missing or blank. Header values that
/// are not visible ASCII are kept (lossily) so they are still reported as
/// unsupported rather than silently passed through.
pub fn content_encoding_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::CONTENT_ENCODING)?;
    let token = String::from_utf8_lossy(value.as_bytes())
        .trim()
        .to_ascii_lowercase();

    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

async fn read_body(body: Body, limit: usize) -> Result<Bytes> {
    let collected = Limited::new(body, limit)
        .collect()
        .await
        .map_err(|e| DecompressError::BodyRead(e.to_string()))?;
    Ok(collected.to_bytes())
}
