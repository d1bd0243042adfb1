//! Server helpers

use crate::server::server::HttpServer;
use crate::utils::error::GatewayError;

impl HttpServer {
    /// Turn a bind failure into an error that tells the operator what to do
    pub(crate) fn format_bind_error(
        error: std::io::Error,
        bind_addr: &str,
        port: u16,
    ) -> GatewayError {
        if error.kind() == std::io::ErrorKind::AddrInUse {
            return GatewayError::server(format!(
                "Port {} is already in use. Stop the other process or set GATEWAY_PORT to a free port.",
                port
            ));
        }

        GatewayError::server(format!("Failed to bind to {}: {}", bind_addr, error))
    }
}
