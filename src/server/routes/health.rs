//! Health check endpoint

use crate::core::batch::StatsSnapshot;
use crate::server::state::AppState;
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tracing::debug;

/// Configure health routes (mounted under `/api`)
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/metrics", web::get().to(metrics));
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// `healthy` while the scheduler runs, `stopped` otherwise
    pub status: Cow<'static, str>,
    pub service: Cow<'static, str>,
    pub version: Cow<'static, str>,
    pub git_hash: Cow<'static, str>,
    pub build_time: Cow<'static, str>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub scheduler: StatsSnapshot,
}

/// Health check endpoint
///
/// Answers 503 once the inference service has been stopped so load
/// balancers stop routing to this instance.
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    debug!("Health check requested");

    let scheduler = state.service.stats();
    let running = scheduler.running;
    let build = crate::build_info();

    let health_status = HealthStatus {
        status: Cow::Borrowed(if running { "healthy" } else { "stopped" }),
        service: Cow::Borrowed("sentiment-analysis"),
        version: Cow::Borrowed(build.version),
        git_hash: Cow::Borrowed(build.git_hash),
        build_time: Cow::Borrowed(build.build_time),
        timestamp: chrono::Utc::now(),
        scheduler,
    };

    if running {
        HttpResponse::Ok().json(health_status)
    } else {
        HttpResponse::ServiceUnavailable().json(health_status)
    }
}

/// Scheduler counters and queue depth as JSON
pub async fn metrics(state: web::Data<AppState>) -> HttpResponse {
    debug!("Metrics requested");
    HttpResponse::Ok().json(state.service.stats())
}
