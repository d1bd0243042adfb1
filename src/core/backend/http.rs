//! HTTP model-server backend
//!
//! Posts `{"inputs": [...]}` to the configured endpoint. The server may
//! answer with every label score per text (`[[{label, score}, ...], ...]`)
//! or with the top label per text (`[{label, score}, ...]`).

use super::{BackendError, Classification, InferenceBackend, LabelScore};
use crate::config::ModelConfig;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Backend that forwards batches to an external model server
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    inputs: &'a [String],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ClassifyResponse {
    AllScores(Vec<Vec<LabelScore>>),
    TopLabel(Vec<LabelScore>),
}

impl ClassifyResponse {
    fn len(&self) -> usize {
        match self {
            ClassifyResponse::AllScores(rows) => rows.len(),
            ClassifyResponse::TopLabel(rows) => rows.len(),
        }
    }

    fn into_classifications(self) -> std::result::Result<Vec<Classification>, BackendError> {
        match self {
            ClassifyResponse::AllScores(rows) => rows
                .iter()
                .map(|scores| Classification::from_scores(scores))
                .collect(),
            ClassifyResponse::TopLabel(rows) => rows
                .into_iter()
                .map(|top| Classification::from_scores(std::slice::from_ref(&top)))
                .collect(),
        }
    }
}

impl HttpBackend {
    /// Create a backend for the configured model endpoint
    pub fn new(config: &ModelConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(config.pool_size)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            timeout,
        })
    }

    /// Model server endpoint
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn map_transport_error(&self, err: reqwest::Error) -> BackendError {
        if err.is_timeout() {
            BackendError::Timeout(self.timeout)
        } else {
            BackendError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl InferenceBackend for HttpBackend {
    async fn classify(
        &self,
        texts: Vec<String>,
    ) -> std::result::Result<Vec<Classification>, BackendError> {
        debug!(endpoint = %self.endpoint, inputs = texts.len(), "Calling model server");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&ClassifyRequest { inputs: &texts })
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: ClassifyResponse = response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;

        if payload.len() != texts.len() {
            return Err(BackendError::InvalidResponse(format!(
                "expected {} results, got {}",
                texts.len(),
                payload.len()
            )));
        }

        payload.into_classifications()
    }
}
