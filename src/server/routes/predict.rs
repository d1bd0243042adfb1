//! Classification endpoints

use crate::core::backend::Classification;
use crate::server::state::AppState;
use crate::utils::error::{GatewayError, Result};
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configure classification routes (mounted under `/api`)
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/predict", web::post().to(predict))
        .route("/predict/batch", web::post().to(predict_batch))
        .route("/model/info", web::get().to(model_info));
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchPredictRequest {
    pub texts: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchPredictResponse {
    pub results: Vec<Classification>,
}

/// Model and batching settings reported by `/api/model/info`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub endpoint: String,
    pub max_batch_size: usize,
    pub max_batch_wait_ms: u64,
    pub request_timeout_ms: u64,
}

/// Classify a single text
pub async fn predict(
    state: web::Data<AppState>,
    request: web::Json<PredictRequest>,
) -> Result<HttpResponse> {
    let text = request.into_inner().text;
    if text.trim().is_empty() {
        return Err(GatewayError::validation("text cannot be empty"));
    }

    let result = state.service.predict(text).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// Classify several texts; results keep the input order
pub async fn predict_batch(
    state: web::Data<AppState>,
    request: web::Json<BatchPredictRequest>,
) -> Result<HttpResponse> {
    let texts = request.into_inner().texts;
    if let Some(index) = texts.iter().position(|t| t.trim().is_empty()) {
        return Err(GatewayError::validation(format!(
            "texts[{}] cannot be empty",
            index
        )));
    }

    debug!(count = texts.len(), "Batch prediction requested");
    let results = state.service.predict_batch(texts).await?;
    Ok(HttpResponse::Ok().json(BatchPredictResponse { results }))
}

pub async fn model_info(state: web::Data<AppState>) -> HttpResponse {
    let config = state.config();
    HttpResponse::Ok().json(ModelInfo {
        name: config.model().name.clone(),
        endpoint: config.model().endpoint.clone(),
        max_batch_size: config.batching().max_batch_size,
        max_batch_wait_ms: config.batching().max_batch_wait_ms,
        request_timeout_ms: config.batching().request_timeout_ms,
    })
}
