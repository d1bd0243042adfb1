//! Server builder and run_server function
//!
//! `run_server` wires the model backend, the inference service and the HTTP
//! server together and owns the service lifecycle around the server run.

use crate::config::Config;
use crate::core::backend::{HttpBackend, InferenceBackend};
use crate::server::server::HttpServer;
use crate::services::InferenceService;
use crate::utils::error::{GatewayError, Result};
use std::sync::Arc;
use tracing::info;

/// Server builder for easier configuration
pub struct ServerBuilder {
    config: Option<Config>,
    backend: Option<Arc<dyn InferenceBackend>>,
}

impl ServerBuilder {
    /// Create a new server builder
    pub fn new() -> Self {
        Self {
            config: None,
            backend: None,
        }
    }

    /// Set configuration
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Use this backend instead of the HTTP model client built from the config
    pub fn with_backend(mut self, backend: Arc<dyn InferenceBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Build the HTTP server and its (not yet started) inference service
    pub fn build(self) -> Result<(HttpServer, Arc<InferenceService>)> {
        let config = self
            .config
            .ok_or_else(|| GatewayError::Config("Configuration is required".to_string()))?;

        let backend = match self.backend {
            Some(backend) => backend,
            None => Arc::new(HttpBackend::new(config.model())?),
        };

        let service = Arc::new(InferenceService::new(backend, config.batching().policy()));
        let server = HttpServer::new(&config, Arc::clone(&service));
        Ok((server, service))
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Run the gateway until the HTTP server shuts down
pub async fn run_server(config: Config) -> Result<()> {
    info!("Starting sentiment gateway");

    let (server, service) = ServerBuilder::new().with_config(config.clone()).build()?;

    info!(
        model = %config.model().name,
        endpoint = %config.model().endpoint,
        max_batch_size = config.batching().max_batch_size,
        max_batch_wait_ms = config.batching().max_batch_wait_ms,
        "Inference service configured"
    );
    info!("API Endpoints:");
    info!("   POST /api/predict - Classify one text");
    info!("   POST /api/predict/batch - Classify several texts");
    info!("   GET  /api/model/info - Model information");
    info!("   GET  /api/health - Health and scheduler statistics");

    service.start();
    let served = server.start().await;

    // Resolve whatever is still queued before the process exits
    service.stop().await;
    served
}
