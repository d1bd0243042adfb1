//! HTTP response handling for errors

use super::types::GatewayError;
use crate::core::batch::BatchError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

impl GatewayError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            GatewayError::Batch(batch_error) => match batch_error {
                BatchError::BackendFailure(_) => (StatusCode::BAD_GATEWAY, "BACKEND_FAILURE"),
                BatchError::RequestTimeout { .. } => {
                    (StatusCode::GATEWAY_TIMEOUT, "REQUEST_TIMEOUT")
                }
                BatchError::ServiceNotRunning => {
                    (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_NOT_RUNNING")
                }
                BatchError::ShutdownCancelled => {
                    (StatusCode::SERVICE_UNAVAILABLE, "SHUTDOWN_CANCELLED")
                }
                BatchError::BatchTooLarge { .. } => (StatusCode::BAD_REQUEST, "BATCH_TOO_LARGE"),
            },
            GatewayError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            GatewayError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            GatewayError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl ResponseError for GatewayError {
    fn status_code(&self) -> StatusCode {
        self.status_and_code().0
    }

    fn error_response(&self) -> HttpResponse {
        let (status_code, error_code) = self.status_and_code();

        // Internal details stay in the logs
        let message = match status_code {
            StatusCode::INTERNAL_SERVER_ERROR => "An internal error occurred".to_string(),
            _ => self.to_string(),
        };

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: error_code.to_string(),
                message,
                timestamp: chrono::Utc::now().timestamp(),
            },
        };

        HttpResponse::build(status_code).json(error_response)
    }
}

/// Standard error response format
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail structure
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    pub timestamp: i64,
}
