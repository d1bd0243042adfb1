//! Batching behavior through the public service facade
//!
//! Time is paused in these tests, so window and timeout bounds are exact.

#[cfg(test)]
mod tests {
    use crate::common::{FlakyBackend, GatedBackend, RecordingBackend, policy, service_with};
    use futures::future::join_all;
    use sentiment_gateway::BatchError;
    use std::time::Duration;
    use tokio::time::{Instant, sleep};

    // ==================== Isolation and bounds ====================

    /// Every concurrent caller receives exactly its own result
    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_receive_own_results() {
        let backend = RecordingBackend::new();
        let service = service_with(backend.clone(), policy(8, 10, 5_000));

        let callers = (0..40).map(|i| {
            let service = service.clone();
            tokio::spawn(async move {
                let text = format!("text-{}", i);
                let result = service.predict(text.clone()).await.unwrap();
                (text, result.label)
            })
        });

        for joined in join_all(callers).await {
            let (text, label) = joined.unwrap();
            assert_eq!(text, label);
        }

        let sizes = backend.call_sizes();
        assert!(sizes.iter().all(|&n| n <= 8), "oversized call: {:?}", sizes);
        assert_eq!(sizes.iter().sum::<usize>(), 40);
        assert!(sizes.len() >= 5);
        service.stop().await;
    }

    /// Multi-text requests are never split across calls and keep their order
    #[tokio::test(start_paused = true)]
    async fn test_multi_text_requests_stay_whole() {
        let backend = RecordingBackend::new();
        let service = service_with(backend.clone(), policy(8, 10, 5_000));

        let callers = (0..5).map(|i| {
            let service = service.clone();
            tokio::spawn(async move {
                let texts: Vec<String> = (0..3).map(|j| format!("r{}-t{}", i, j)).collect();
                let results = service.predict_batch(texts.clone()).await.unwrap();
                (texts, results)
            })
        });

        for joined in join_all(callers).await {
            let (texts, results) = joined.unwrap();
            let labels: Vec<String> = results.into_iter().map(|r| r.label).collect();
            assert_eq!(labels, texts);
        }

        for call in backend.calls() {
            assert!(call.inputs.len() <= 8);
            assert_eq!(call.inputs.len() % 3, 0, "request split: {:?}", call.inputs);
        }
        service.stop().await;
    }

    // ==================== Timing ====================

    /// A lone request is held for the window, then dispatched
    #[tokio::test(start_paused = true)]
    async fn test_lone_request_waits_at_most_the_window() {
        let backend = RecordingBackend::new();
        let service = service_with(backend.clone(), policy(16, 50, 5_000));

        let submitted = Instant::now();
        service.predict("alone").await.unwrap();

        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        let held = calls[0].at.duration_since(submitted);
        assert!(held >= Duration::from_millis(50), "flushed early: {:?}", held);
        assert!(held <= Duration::from_millis(51), "flushed late: {:?}", held);
        service.stop().await;
    }

    /// A full batch does not wait for the window
    #[tokio::test(start_paused = true)]
    async fn test_full_batch_flushes_immediately() {
        let backend = RecordingBackend::new();
        let service = service_with(backend.clone(), policy(4, 1_000, 5_000));

        let submitted = Instant::now();
        let results = join_all(["a", "b", "c", "d"].map(|t| service.predict(t))).await;
        assert!(results.iter().all(|r| r.is_ok()));

        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].at.duration_since(submitted) < Duration::from_millis(1_000));
        service.stop().await;
    }

    // ==================== Failures ====================

    /// A failed call fails only its batch; later requests are served
    #[tokio::test(start_paused = true)]
    async fn test_scheduler_survives_backend_failure() {
        let backend = FlakyBackend::new(1);
        let service = service_with(backend.clone(), policy(4, 10, 5_000));

        let first = service.predict("first").await;
        assert!(matches!(first, Err(BatchError::BackendFailure(_))));

        let second = service.predict("second").await.unwrap();
        assert_eq!(second.label, "second");
        assert_eq!(backend.calls(), 2);
        assert_eq!(service.stats().backend_failures, 1);
        service.stop().await;
    }

    /// Queued requests time out while the backend hangs; the claimed one
    /// keeps waiting for its batch
    #[tokio::test(start_paused = true)]
    async fn test_queued_requests_time_out_while_backend_hangs() {
        let backend = GatedBackend::new();
        let service = service_with(backend.clone(), policy(1, 10, 500));

        let in_flight = tokio::spawn({
            let service = service.clone();
            async move { service.predict("in-flight").await }
        });
        sleep(Duration::from_millis(50)).await;
        assert_eq!(backend.entered(), 1);

        let queued = tokio::spawn({
            let service = service.clone();
            async move { service.predict("queued").await }
        });

        assert!(matches!(
            queued.await.unwrap(),
            Err(BatchError::RequestTimeout { .. })
        ));
        sleep(Duration::from_secs(2)).await;
        assert!(!in_flight.is_finished());
        assert_eq!(service.stats().requests_timed_out, 1);

        backend.release(1);
        let result = in_flight.await.unwrap().unwrap();
        assert_eq!(result.label, "in-flight");
        assert_eq!(service.stats().requests_timed_out, 1);
        assert_eq!(backend.entered(), 1);

        service.stop().await;
    }

    // ==================== Lifecycle ====================

    /// Stop resolves queued and in-flight requests and rejects new ones
    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_outstanding_requests() {
        let backend = GatedBackend::new();
        let service = service_with(backend.clone(), policy(2, 10, 60_000));

        let spawn_predict = |text: &'static str| {
            let service = service.clone();
            tokio::spawn(async move { service.predict(text).await })
        };

        let a = spawn_predict("a");
        let b = spawn_predict("b");
        sleep(Duration::from_millis(20)).await;
        assert_eq!(backend.entered(), 1);

        let c = spawn_predict("c");
        sleep(Duration::from_millis(20)).await;

        assert!(service.stop().await);

        for handle in [a, b, c] {
            assert!(matches!(
                handle.await.unwrap(),
                Err(BatchError::ShutdownCancelled)
            ));
        }
        assert_eq!(service.stats().requests_cancelled, 3);
        assert!(matches!(
            service.predict("late").await,
            Err(BatchError::ServiceNotRunning)
        ));
    }

    /// A stopped service can be started again
    #[tokio::test(start_paused = true)]
    async fn test_restart_after_stop() {
        let backend = RecordingBackend::new();
        let service = service_with(backend.clone(), policy(4, 10, 5_000));

        assert!(service.stop().await);
        assert!(!service.stop().await);
        assert!(service.start());

        let result = service.predict("again").await.unwrap();
        assert_eq!(result.label, "again");
        service.stop().await;
    }

    /// A caller that gives up is removed from the queue
    #[tokio::test(start_paused = true)]
    async fn test_abandoned_request_is_not_dispatched() {
        let backend = RecordingBackend::new();
        let service = service_with(backend.clone(), policy(4, 100, 5_000));

        let gave_up =
            tokio::time::timeout(Duration::from_millis(10), service.predict("abandoned")).await;
        assert!(gave_up.is_err());
        assert_eq!(service.stats().queued_requests, 0);

        service.predict("kept").await.unwrap();

        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].inputs, vec!["kept".to_string()]);
        service.stop().await;
    }
}
