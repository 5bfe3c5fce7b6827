//! Configuration management.
//!
//! Supports configuration from:
//! - TOML config files
//! - Environment variables
//! - CLI arguments (for the server binary)
//!
//! The decompressor itself is configured by the `[request_decompress]`
//! section:
//!
//! ```toml
//! [request_decompress]
//! encodings = ["gzip", "bz2", "zstd"]
//! max_body_size = 10485760
//! max_decoded_size = 67108864
//! ```

use std::collections::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::codec::Encoding;
use crate::error::{DecompressError, Result};

/// Environment variable prefix for overrides
const ENV_PREFIX: &str = "REQUEST_DECOMPRESS";

/// Main configuration struct
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Host server configuration
    #[serde(default)]
    pub server: ServerSettings,

    /// Decompression middleware configuration
    #[serde(default)]
    pub request_decompress: DecompressionConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            DecompressError::Config(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        Self::from_toml(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| DecompressError::Config(format!("Failed to parse config: {e}")))?;
        config.request_decompress.validate()?;
        Ok(config)
    }

    /// Default config file location (`<config dir>/request-decompress/config.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("request-decompress").join("config.toml"))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        let var = |name: &str| std::env::var(format!("{ENV_PREFIX}_{name}")).ok();

        // Server settings
        if let Some(host) = var("HOST") {
            config.server.host = host;
        }
        if let Some(port) = var("PORT") {
            config.server.port = port
                .parse()
                .map_err(|e| DecompressError::Config(format!("Invalid port {port:?}: {e}")))?;
        }

        // Decompression settings
        if let Some(list) = var("ENCODINGS") {
            config.request_decompress.encodings = parse_encoding_list(&list)?;
        }
        if let Some(size) = var("MAX_BODY_SIZE") {
            config.request_decompress.max_body_size = parse_size(&size)?;
        }
        if let Some(size) = var("MAX_DECODED_SIZE") {
            config.request_decompress.max_decoded_size = parse_size(&size)?;
        }

        config.request_decompress.validate()?;
        Ok(config)
    }

    /// Merge with another config (other takes precedence where it differs from defaults)
    pub fn merge(self, other: Self) -> Self {
        let server_defaults = ServerSettings::default();
        let decompress_defaults = DecompressionConfig::default();

        Self {
            server: ServerSettings {
                host: if other.server.host != server_defaults.host {
                    other.server.host
                } else {
                    self.server.host
                },
                port: if other.server.port != server_defaults.port {
                    other.server.port
                } else {
                    self.server.port
                },
                logging: other.server.logging && self.server.logging,
            },
            request_decompress: DecompressionConfig {
                encodings: if other.request_decompress.encodings != decompress_defaults.encodings {
                    other.request_decompress.encodings
                } else {
                    self.request_decompress.encodings
                },
                max_body_size: if other.request_decompress.max_body_size
                    != decompress_defaults.max_body_size
                {
                    other.request_decompress.max_body_size
                } else {
                    self.request_decompress.max_body_size
                },
                max_decoded_size: if other.request_decompress.max_decoded_size
                    != decompress_defaults.max_decoded_size
                {
                    other.request_decompress.max_decoded_size
                } else {
                    self.request_decompress.max_decoded_size
                },
            },
        }
    }
}

/// Host server settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Enable request tracing
    pub logging: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            logging: true,
        }
    }
}

impl ServerSettings {
    /// Get the full listen address
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Decompression middleware configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecompressionConfig {
    /// Encodings accepted in `Content-Encoding`; anything else is rejected
    pub encodings: Vec<Encoding>,

    /// Maximum compressed request body size in bytes
    pub max_body_size: usize,

    /// Maximum decoded body size in bytes
    pub max_decoded_size: usize,
}

impl Default for DecompressionConfig {
    fn default() -> Self {
        Self {
            encodings: Encoding::default_enabled().to_vec(),
            max_body_size: 10 * 1024 * 1024,    // 10 MB
            max_decoded_size: 64 * 1024 * 1024, // 64 MB
        }
    }
}

impl DecompressionConfig {
    /// Replace the enabled encodings
    pub fn with_encodings(mut self, encodings: impl IntoIterator<Item = Encoding>) -> Self {
        self.encodings = encodings.into_iter().collect();
        self
    }

    /// Set max compressed body size
    pub fn with_max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = size;
        self
    }

    /// Set max decoded body size
    pub fn with_max_decoded_size(mut self, size: usize) -> Self {
        self.max_decoded_size = size;
        self
    }

    /// Whether `encoding` is accepted
    pub fn is_enabled(&self, encoding: Encoding) -> bool {
        self.encodings.contains(&encoding)
    }

    /// Check the configuration for values the decompressor cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.encodings.is_empty() {
            return Err(DecompressError::Config(
                "request_decompress.encodings must not be empty".to_string(),
            ));
        }

        let unique: HashSet<_> = self.encodings.iter().collect();
        if unique.len() != self.encodings.len() {
            return Err(DecompressError::Config(
                "request_decompress.encodings contains duplicates".to_string(),
            ));
        }

        if self.max_body_size == 0 || self.max_decoded_size == 0 {
            return Err(DecompressError::Config(
                "request_decompress size limits must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

/// Parse a comma-separated list of encoding tokens (e.g. `gzip,zstd,br`)
pub fn parse_encoding_list(list: &str) -> Result<Vec<Encoding>> {
    list.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .parse::<Encoding>()
                .map_err(|_| DecompressError::Config(format!("Unknown encoding: {token}")))
        })
        .collect()
}

fn parse_size(value: &str) -> Result<usize> {
    value
        .trim()
        .parse()
        .map_err(|e| DecompressError::Config(format!("Invalid size {value:?}: {e}")))
}
