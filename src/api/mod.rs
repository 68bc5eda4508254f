//! Web API for the key-concept analyzer
//!
//! Exposes the analysis pipeline over HTTP: POST /analyze_video runs the
//! full pipeline for one video, GET /health reports service and provider
//! status.

use anyhow::Result;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::config::Config;
use crate::pipeline::VideoAnalyzer;

pub mod handlers;
pub mod models;
pub mod server;

/// API server wrapping a shared analyzer
pub struct ApiServer {
    analyzer: Arc<VideoAnalyzer>,
    host: String,
    port: u16,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(analyzer: Arc<VideoAnalyzer>, config: &Config) -> Self {
        Self {
            analyzer,
            host: config.server.host.clone(),
            port: config.server.port,
        }
    }

    /// Start the API server in the background
    pub fn start_background(self) -> JoinHandle<Result<()>> {
        tokio::spawn(async move { self.start().await })
    }

    /// Start the API server
    pub async fn start(self) -> Result<()> {
        info!("🚀 Starting API server on port {}", self.port);

        server::start_http_server(self.analyzer, &self.host, self.port).await
    }
}
