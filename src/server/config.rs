//! Server configuration.

use std::net::SocketAddr;

use crate::codec::Encoding;
use crate::config::{Config, DecompressionConfig};
use crate::error::{DecompressError, Result};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address
    pub addr: SocketAddr,
    /// Decompression middleware settings
    pub decompression: DecompressionConfig,
    /// Enable request tracing
    pub logging: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            decompression: DecompressionConfig::default(),
            logging: true,
        }
    }
}

impl ServerConfig {
    /// Build from a loaded [`Config`]
    pub fn from_config(config: &Config) -> Result<Self> {
        let addr = config.server.listen_addr();
        let addr = addr
            .parse()
            .map_err(|e| DecompressError::Config(format!("Invalid listen address {addr}: {e}")))?;

        Ok(Self {
            addr,
            decompression: config.request_decompress.clone(),
            logging: config.server.logging,
        })
    }

    /// Create with custom port
    pub fn with_port(mut self, port: u16) -> Self {
        self.addr.set_port(port);
        self
    }

    /// Bind to all interfaces
    pub fn bind_all(mut self) -> Self {
        self.addr = SocketAddr::from(([0, 0, 0, 0], self.addr.port()));
        self
    }

    /// Set address directly
    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    /// Set the enabled encodings
    pub fn with_encodings(mut self, encodings: impl IntoIterator<Item = Encoding>) -> Self {
        self.decompression = self.decompression.with_encodings(encodings);
        self
    }

    /// Set max compressed body size
    pub fn with_max_body_size(mut self, size: usize) -> Self {
        self.decompression.max_body_size = size;
        self
    }

    /// Disable logging
    pub fn without_logging(mut self) -> Self {
        self.logging = false;
        self
    }
}
