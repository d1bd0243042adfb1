//! # sentiment-gateway
//!
//! Sentiment classification gateway that coalesces concurrent inference
//! requests into bounded batches before calling the model server.
//!
//! ## Features
//!
//! - **Request batching**: concurrent callers share one model call, bounded by
//!   a maximum batch size and a maximum coalescing wait
//! - **Per-request isolation**: every caller receives exactly its own results,
//!   in input order, or an error
//! - **Bounded latency**: waiting requests fail with a timeout even when the
//!   model server hangs
//! - **REST API**: `actix-web` endpoints for single and batch prediction
//!
//! ## Library usage
//!
//! ```rust,no_run
//! use sentiment_gateway::{Config, HttpBackend, InferenceService};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config/gateway.yaml").await?;
//!     let backend = Arc::new(HttpBackend::new(config.model())?);
//!
//!     let service = InferenceService::new(backend, config.batching().policy());
//!     service.start();
//!
//!     let result = service.predict("What a wonderful day").await?;
//!     println!("{} ({:.3})", result.label, result.score);
//!
//!     service.stop().await;
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod core;
pub mod server;
pub mod services;
pub mod utils;

// Re-export main types
pub use config::Config;
pub use core::backend::{BackendError, Classification, HttpBackend, InferenceBackend};
pub use core::batch::{BatchError, BatchPolicy, StatsSnapshot};
pub use services::InferenceService;
pub use utils::error::{GatewayError, Result};

// Version information
/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Description of the crate
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Gateway build information
#[derive(Debug, Clone)]
pub struct BuildInfo {
    /// Version number
    pub version: &'static str,
    /// Unix timestamp of the build
    pub build_time: &'static str,
    /// Git commit hash
    pub git_hash: &'static str,
    /// Rust version
    pub rust_version: &'static str,
}

/// Build information captured by the build script
pub fn build_info() -> BuildInfo {
    BuildInfo {
        version: VERSION,
        build_time: env!("BUILD_TIME"),
        git_hash: env!("GIT_HASH"),
        rust_version: env!("RUST_VERSION"),
    }
}
