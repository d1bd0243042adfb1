//! Error handling for the gateway
//!
//! This module defines the crate-level error type, its helper constructors
//! and the HTTP response mapping used by the server.

mod helpers;
mod response;
mod types;


pub use response::{ErrorDetail, ErrorResponse};
pub use types::{GatewayError, Result};
