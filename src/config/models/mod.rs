//! Configuration data models
//!
//! This module defines all configuration structures used by the gateway.

pub mod batching;
pub mod gateway;
pub mod logging;
pub mod model;
pub mod server;

// Re-export all configuration types
pub use batching::*;
pub use gateway::*;
pub use logging::*;
pub use model::*;
pub use server::*;

/// Default values for configuration
pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

/// Default server port
pub fn default_port() -> u16 {
    8000
}

/// Default maximum body size in bytes
pub fn default_max_body_size() -> usize {
    2 * 1024 * 1024 // 2MB
}

/// Default maximum input units per backend call
pub fn default_max_batch_size() -> usize {
    16
}

/// Default coalescing window in milliseconds
pub fn default_max_batch_wait_ms() -> u64 {
    100
}

/// Default maximum request age in milliseconds
pub fn default_request_timeout_ms() -> u64 {
    30_000
}

/// Default model name
pub fn default_model_name() -> String {
    "siebert/sentiment-roberta-large-english".to_string()
}

/// Default model server endpoint
pub fn default_model_endpoint() -> String {
    "http://127.0.0.1:8080/classify".to_string()
}

/// Default model call timeout in seconds
pub fn default_model_timeout() -> u64 {
    30
}

/// Default idle connections kept to the model server
pub fn default_pool_size() -> usize {
    16
}

pub fn default_log_level() -> String {
    "info".to_string()
}
