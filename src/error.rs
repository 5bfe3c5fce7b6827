//! Error types for request decompression.
//!
//! Every failure on the decode path of a request is a client error: the
//! request is rejected with `400 Bad Request` and never reaches the next
//! handler. The remaining variants belong to the host server and its
//! configuration and map to `500 Internal Server Error`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::codec::Encoding;

/// Request decompression errors.
#[derive(Error, Debug)]
pub enum DecompressError {
    /// The request body could not be read in full.
    #[error("Failed to read request body: {0}")]
    BodyRead(String),

    /// The `Content-Encoding` token is not in the enabled set.
    #[error("unsupported Content-Encoding: {0}")]
    UnsupportedEncoding(String),

    /// The decoder rejected the stream header before any data was read.
    #[error("Invalid {encoding} stream: {message}")]
    DecoderConstruction {
        /// Encoding whose decoder failed.
        encoding: Encoding,
        /// Underlying decoder message.
        message: String,
    },

    /// The compressed payload was truncated or corrupt.
    #[error("Failed to decode {encoding} body: {message}")]
    DecodeStream {
        /// Encoding whose stream failed.
        encoding: Encoding,
        /// Underlying decoder message.
        message: String,
    },

    /// The decoded body grew past the configured limit.
    #[error("Decoded {encoding} body exceeds {limit} bytes")]
    DecodedBodyTooLarge {
        /// Encoding being decoded.
        encoding: Encoding,
        /// Configured limit in bytes.
        limit: usize,
    },

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// Server-side error.
    #[error("Server error: {0}")]
    Server(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for decompression operations
pub type Result<T> = std::result::Result<T, DecompressError>;

impl DecompressError {
    /// Whether the error was caused by the request rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            DecompressError::BodyRead(_)
                | DecompressError::UnsupportedEncoding(_)
                | DecompressError::DecoderConstruction { .. }
                | DecompressError::DecodeStream { .. }
                | DecompressError::DecodedBodyTooLarge { .. }
        )
    }

    /// HTTP status used when this error is turned into a response.
    pub fn status_code(&self) -> StatusCode {
        if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for DecompressError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            Json(serde_json::json!({"error": self.to_string()})),
        )
            .into_response()
    }
}

impl From<toml::de::Error> for DecompressError {
    fn from(err: toml::de::Error) -> Self {
        DecompressError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_message() {
        let err = DecompressError::UnsupportedEncoding("deflate".to_string());
        assert_eq!(err.to_string(), "unsupported Content-Encoding: deflate");
    }

    #[test]
    fn test_decode_errors_are_bad_request() {
        let errors = [
            DecompressError::BodyRead("reset".to_string()),
            DecompressError::UnsupportedEncoding("lz4".to_string()),
            DecompressError::DecoderConstruction {
                encoding: Encoding::Gzip,
                message: "invalid gzip header".to_string(),
            },
            DecompressError::DecodeStream {
                encoding: Encoding::Zstd,
                message: "incomplete frame".to_string(),
            },
            DecompressError::DecodedBodyTooLarge {
                encoding: Encoding::Bzip2,
                limit: 16,
            },
        ];

        for err in errors {
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST, "{err}");
        }
    }

    #[test]
    fn test_server_errors_are_internal() {
        let err = DecompressError::Server("bind failed".to_string());
        assert!(!err.is_client_error());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
