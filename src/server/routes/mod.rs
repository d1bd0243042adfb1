//! HTTP route modules
//!
//! This module contains all HTTP route handlers organized by functionality.

pub mod health;
pub mod predict;

use actix_web::web;

/// Register every route of the gateway
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .route("/metrics", web::get().to(health::metrics))
        .service(
            web::scope("/api")
                .configure(predict::configure_routes)
                .configure(health::configure_routes),
        );
}
