//! Inference backend abstraction
//!
//! A backend turns an ordered sequence of input texts into an ordered
//! sequence of classifications of the same length. Backends have no batching
//! of their own; the batch scheduler decides how many texts go into a call.

mod http;
mod types;

pub use http::HttpBackend;
pub use types::{Classification, LabelScore};

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by an inference backend for a whole call
#[derive(Error, Debug)]
pub enum BackendError {
    /// The request never produced an HTTP response
    #[error("backend request failed: {0}")]
    Transport(String),

    /// The model server answered with a non-success status
    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response could not be mapped onto the inputs
    #[error("invalid backend response: {0}")]
    InvalidResponse(String),

    /// The call did not complete within the configured timeout
    #[error("backend call timed out after {0:?}")]
    Timeout(Duration),

    /// Any other backend-specific failure
    #[error("{0}")]
    Other(String),
}

/// Model invocation collaborator
///
/// Implementations must return exactly one [`Classification`] per input, in
/// input order, or fail the whole call.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InferenceBackend: Send + Sync + 'static {
    /// Classify every text in `texts`
    async fn classify(&self, texts: Vec<String>) -> Result<Vec<Classification>, BackendError>;
}
