//! Main gateway configuration

use super::*;
use serde::{Deserialize, Serialize};

/// Main gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GatewayConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Request batching configuration
    #[serde(default)]
    pub batching: BatchingConfig,
    /// Model backend configuration
    #[serde(default)]
    pub model: ModelConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}
