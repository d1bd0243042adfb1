//! Model backend configuration

use super::*;
use serde::{Deserialize, Serialize};

/// Model backend configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model name reported by the model info endpoint
    #[serde(default = "default_model_name")]
    pub name: String,
    /// Model server classification endpoint
    #[serde(default = "default_model_endpoint")]
    pub endpoint: String,
    /// Timeout of a single model call in seconds
    #[serde(default = "default_model_timeout")]
    pub timeout_secs: u64,
    /// Idle connections kept to the model server
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model_name(),
            endpoint: default_model_endpoint(),
            timeout_secs: default_model_timeout(),
            pool_size: default_pool_size(),
        }
    }
}
