//! HTTP model backend against a mock model server

#[cfg(test)]
mod tests {
    use crate::common::{policy, service_with};
    use sentiment_gateway::config::ModelConfig;
    use sentiment_gateway::{BackendError, BatchError, HttpBackend, InferenceBackend};
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend_for(server: &MockServer, timeout_secs: u64) -> HttpBackend {
        let config = ModelConfig {
            endpoint: format!("{}/classify", server.uri()),
            timeout_secs,
            ..Default::default()
        };
        HttpBackend::new(&config).unwrap()
    }

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_all_scores_response_is_folded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/classify"))
            .and(body_json(json!({ "inputs": ["great", "awful"] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                [{ "label": "POSITIVE", "score": 0.97 }, { "label": "NEGATIVE", "score": 0.03 }],
                [{ "label": "POSITIVE", "score": 0.10 }, { "label": "NEGATIVE", "score": 0.90 }]
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let results = backend_for(&server, 5)
            .classify(texts(&["great", "awful"]))
            .await
            .unwrap();

        assert_eq!(results[0].label, "positive");
        assert!((results[0].score - 0.97).abs() < 1e-6);
        assert_eq!(results[1].label, "negative");
        assert!((results[1].score - 0.90).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_top_label_response_is_normalized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/classify"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "label": "POS", "score": 0.8 },
                { "label": "neg", "score": 0.6 }
            ])))
            .mount(&server)
            .await;

        let results = backend_for(&server, 5)
            .classify(texts(&["a", "b"]))
            .await
            .unwrap();

        let labels: Vec<_> = results.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, ["positive", "negative"]);
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("model loading"))
            .mount(&server)
            .await;

        let err = backend_for(&server, 5)
            .classify(texts(&["a"]))
            .await
            .unwrap_err();

        match err {
            BackendError::Status { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "model loading");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_result_count_mismatch_is_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{ "label": "positive", "score": 0.9 }])),
            )
            .mount(&server)
            .await;

        let err = backend_for(&server, 5)
            .classify(texts(&["a", "b"]))
            .await
            .unwrap_err();

        assert!(matches!(err, BackendError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_undecodable_body_is_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "oops": true })))
            .mount(&server)
            .await;

        let err = backend_for(&server, 5)
            .classify(texts(&["a"]))
            .await
            .unwrap_err();

        assert!(matches!(err, BackendError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_slow_server_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{ "label": "positive", "score": 0.9 }]))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let err = backend_for(&server, 1)
            .classify(texts(&["a"]))
            .await
            .unwrap_err();

        assert!(matches!(err, BackendError::Timeout(_)));
    }

    /// Concurrent service callers reach the model server as one request
    #[tokio::test]
    async fn test_service_coalesces_into_one_model_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/classify"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "label": "positive", "score": 0.9 },
                { "label": "negative", "score": 0.8 },
                { "label": "positive", "score": 0.7 }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let service = service_with(Arc::new(backend_for(&server, 5)), policy(8, 200, 5_000));

        let (a, b, c) = tokio::join!(
            service.predict("one"),
            service.predict("two"),
            service.predict("three"),
        );

        assert_eq!(a.unwrap().label, "positive");
        assert_eq!(b.unwrap().label, "negative");
        assert_eq!(c.unwrap().label, "positive");
        service.stop().await;
    }

    /// Every request of a failed batch sees the same backend cause
    #[tokio::test]
    async fn test_failed_model_request_fails_every_caller() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("CUDA out of memory"))
            .expect(1)
            .mount(&server)
            .await;

        let service = service_with(Arc::new(backend_for(&server, 5)), policy(8, 200, 5_000));

        let (a, b) = tokio::join!(service.predict("one"), service.predict("two"));

        let (Err(BatchError::BackendFailure(a)), Err(BatchError::BackendFailure(b))) = (a, b)
        else {
            panic!("expected backend failures");
        };
        assert!(Arc::ptr_eq(&a, &b));
        assert!(a.to_string().contains("CUDA out of memory"));
        service.stop().await;
    }
}
