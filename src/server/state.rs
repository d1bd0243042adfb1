//! Application state shared across HTTP handlers

use crate::config::Config;
use crate::services::InferenceService;
use std::sync::Arc;

/// HTTP server state shared across handlers
///
/// Cloned into every actix worker; all fields are behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Gateway configuration (shared read-only)
    pub config: Arc<Config>,
    /// Batched inference service
    pub service: Arc<InferenceService>,
}

impl AppState {
    pub fn new(config: Config, service: Arc<InferenceService>) -> Self {
        Self {
            config: Arc::new(config),
            service,
        }
    }

    /// Get gateway configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
