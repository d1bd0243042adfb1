//! Configuration management for the Gateway
//!
//! This module handles loading, validation, and management of all gateway configuration.
//! Values come from a YAML file or the defaults, then environment overrides are applied.

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

use crate::utils::error::{GatewayError, Result};
use std::path::Path;
use tracing::{debug, info};

/// Main configuration struct for the Gateway
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Gateway configuration
    pub gateway: GatewayConfig,
}

impl Config {
    /// Load configuration from file, then apply environment overrides
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path).await?;

        let mut config = Self::from_yaml(&content)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Load configuration from defaults and environment variables
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML document without validating it
    pub fn from_yaml(content: &str) -> Result<Self> {
        let gateway: GatewayConfig = serde_yaml::from_str(content)?;
        Ok(Self { gateway })
    }

    /// Apply overrides read through `lookup`, keyed by environment variable name
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let gateway = &mut self.gateway;

        if let Some(host) = lookup("GATEWAY_HOST") {
            gateway.server.host = host;
        }
        if let Some(port) = lookup("GATEWAY_PORT") {
            gateway.server.port = parse_override("GATEWAY_PORT", &port)?;
        }
        if let Some(size) = lookup("BATCH_SIZE") {
            gateway.batching.max_batch_size = parse_override("BATCH_SIZE", &size)?;
        }
        if let Some(wait) = lookup("BATCH_TIMEOUT_MS") {
            gateway.batching.max_batch_wait_ms = parse_override("BATCH_TIMEOUT_MS", &wait)?;
        }
        if let Some(timeout) = lookup("REQUEST_TIMEOUT_MS") {
            gateway.batching.request_timeout_ms = parse_override("REQUEST_TIMEOUT_MS", &timeout)?;
        }
        if let Some(origins) = lookup("CORS_ORIGINS") {
            gateway.server.cors.allowed_origins = CorsConfig::parse_origins(&origins);
        }
        if let Some(endpoint) = lookup("MODEL_ENDPOINT") {
            gateway.model.endpoint = endpoint;
        }
        if let Some(name) = lookup("MODEL_NAME") {
            gateway.model.name = name;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            gateway.logging.level = level;
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            gateway.logging.format = parse_override("LOG_FORMAT", &format)?;
        }

        Ok(())
    }

    /// Get server configuration
    pub fn server(&self) -> &ServerConfig {
        &self.gateway.server
    }

    /// Get batching configuration
    pub fn batching(&self) -> &BatchingConfig {
        &self.gateway.batching
    }

    /// Get model configuration
    pub fn model(&self) -> &ModelConfig {
        &self.gateway.model
    }

    /// Get logging configuration
    pub fn logging(&self) -> &LoggingConfig {
        &self.gateway.logging
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        self.gateway
            .validate()
            .map_err(|e| GatewayError::Config(format!("Invalid configuration: {}", e)))?;

        debug!("Configuration validation completed");
        Ok(())
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.gateway)?)
    }
}

fn parse_override<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| GatewayError::Config(format!("Invalid value for {}: {}", key, e)))
}
