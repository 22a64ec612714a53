//! Server Implementation
//!
//! HTTP 服务器启动和管理

use std::net::SocketAddr;

use crate::core::{Config, Result, ServerError, ServerState};
use crate::services::http;

/// HTTP Server
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    pub async fn run(&self) -> Result<()> {
        // Create application state if not provided
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config),
        };

        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        tracing::info!("🏷️ Label Server starting on {}", addr);

        let batch_jobs = state.batch_jobs.clone();
        let shutdown = async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down...");
            // Running batch jobs stop at their next checkpoint
            batch_jobs.cancel_all();
        };

        http::serve(
            http::build_router(state),
            addr,
            shutdown,
            self.config.shutdown_timeout(),
        )
        .await
        .map_err(|source| ServerError::Serve { addr, source })?;

        tracing::info!("Server stopped");
        Ok(())
    }
}
