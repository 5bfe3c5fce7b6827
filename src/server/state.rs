//! Server state.

use std::sync::Arc;
use std::time::{Duration, Instant};

use super::config::ServerConfig;
use crate::middleware::RequestDecompressor;

/// Application state shared across handlers
pub struct AppState {
    /// Server configuration
    pub config: ServerConfig,
    /// Decompressor mounted in front of the body-consuming routes
    pub decompressor: Arc<RequestDecompressor>,
    /// Server start time
    pub start_time: Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(config: ServerConfig) -> Self {
        let decompressor = Arc::new(RequestDecompressor::new(config.decompression.clone()));

        Self {
            config,
            decompressor,
            start_time: Instant::now(),
        }
    }

    /// Get server uptime
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Tokens accepted by the decompressor
    pub fn enabled_encodings(&self) -> Vec<&'static str> {
        self.config
            .decompression
            .encodings
            .iter()
            .map(|encoding| encoding.token())
            .collect()
    }
}
