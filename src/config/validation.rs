//! Configuration validation
//!
//! Every configuration section implements [`Validate`]; errors are plain strings
//! that the loader wraps into `GatewayError::Config`.

use super::models::*;
use url::Url;

/// Validation trait for configuration structures
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

impl Validate for GatewayConfig {
    fn validate(&self) -> Result<(), String> {
        self.server
            .validate()
            .map_err(|e| format!("server: {}", e))?;
        self.batching
            .validate()
            .map_err(|e| format!("batching: {}", e))?;
        self.model.validate().map_err(|e| format!("model: {}", e))?;
        self.logging
            .validate()
            .map_err(|e| format!("logging: {}", e))?;
        Ok(())
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<(), String> {
        if self.host.trim().is_empty() {
            return Err("Server host cannot be empty".to_string());
        }

        if self.port == 0 {
            return Err("Server port must be greater than 0".to_string());
        }

        if let Some(workers) = self.workers {
            if workers == 0 {
                return Err("Worker count must be greater than 0".to_string());
            }
        }

        if self.max_body_size == 0 {
            return Err("Max body size must be greater than 0".to_string());
        }

        self.cors.validate().map_err(|e| format!("cors: {}", e))
    }
}

impl Validate for CorsConfig {
    fn validate(&self) -> Result<(), String> {
        if self.is_wildcard() {
            if self.allow_credentials {
                return Err("Credentials cannot be allowed for the wildcard origin".to_string());
            }
            return Ok(());
        }

        for origin in &self.allowed_origins {
            let url = Url::parse(origin)
                .map_err(|e| format!("Origin '{}' is not a valid URL: {}", origin, e))?;
            if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
                return Err(format!("Origin '{}' must be an http(s) scheme and host", origin));
            }
            if url.path() != "/" || url.query().is_some() {
                return Err(format!("Origin '{}' must not carry a path", origin));
            }
        }

        Ok(())
    }
}

impl Validate for BatchingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_batch_size == 0 {
            return Err("Max batch size must be greater than 0".to_string());
        }

        if self.max_batch_wait_ms == 0 {
            return Err("Max batch wait must be greater than 0".to_string());
        }

        if self.request_timeout_ms <= self.max_batch_wait_ms {
            return Err(format!(
                "Request timeout ({}ms) must be longer than max batch wait ({}ms)",
                self.request_timeout_ms, self.max_batch_wait_ms
            ));
        }

        Ok(())
    }
}

impl Validate for ModelConfig {
    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Model name cannot be empty".to_string());
        }

        let url = Url::parse(&self.endpoint)
            .map_err(|e| format!("Model endpoint has invalid URL format: {}", e))?;
        match url.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(format!(
                    "Model endpoint must use http:// or https:// scheme, got: {}",
                    scheme
                ));
            }
        }
        if url.host_str().is_none() {
            return Err("Model endpoint URL must have a valid host".to_string());
        }

        if self.timeout_secs == 0 {
            return Err("Model timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.level.trim().is_empty() {
            return Err("Log level cannot be empty".to_string());
        }
        Ok(())
    }
}
