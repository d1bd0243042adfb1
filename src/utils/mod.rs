//! Utility modules for the sentiment gateway
//!
//! - **error**: Error types and HTTP error responses
//! - **logging**: Tracing subscriber setup

pub mod error;
pub mod logging;

pub use error::{GatewayError, Result};
pub use logging::init_logging;
