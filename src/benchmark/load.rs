//! Load test orchestration
//!
//! Fires a fixed-size batch of concurrent requests at one endpoint and
//! aggregates the settled batch into a [`ThroughputResult`].

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::metrics::BatchCollector;
use crate::error::BattleError;
use crate::http::Processor;
use crate::models::{Document, Endpoint, EndpointPair, ThroughputResult};
use crate::utils::Timer;

/// Requests per batch when none is configured
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// How the two batches of a pair run relative to each other
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PairMode {
    /// Both batches in flight at the same time
    #[default]
    Concurrent,
    /// Endpoint A's batch settles before endpoint B's starts
    Sequential,
}

/// Runs load-test batches
#[derive(Clone)]
pub struct LoadTestOrchestrator {
    processor: Arc<dyn Processor>,
}

impl LoadTestOrchestrator {
    pub fn new(processor: Arc<dyn Processor>) -> Self {
        Self { processor }
    }

    /// Run one batch of `batch_size` concurrent requests against `endpoint`.
    ///
    /// The elapsed time spans from the first dispatch until every call has
    /// settled, failed calls included. Only successful calls contribute to
    /// the mean latency.
    pub async fn run(
        &self,
        endpoint: &Endpoint,
        document: &Document,
        batch_size: usize,
    ) -> Result<ThroughputResult, BattleError> {
        if document.is_empty() {
            return Err(BattleError::EmptyInput);
        }
        if batch_size == 0 {
            return Err(BattleError::InvalidBatchSize);
        }

        info!(
            "Starting load test: {} requests against {}",
            batch_size, endpoint
        );

        let shared_endpoint = Arc::new(endpoint.clone());
        let shared_document = Arc::new(document.clone());
        let mut tasks = JoinSet::new();

        let timer = Timer::start(format!("{} batch", endpoint.label));
        for _ in 0..batch_size {
            let processor = self.processor.clone();
            let endpoint = shared_endpoint.clone();
            let document = shared_document.clone();
            tasks.spawn(async move { processor.process(&endpoint, &document).await });
        }

        let mut collector = BatchCollector::new(batch_size);
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => {
                    if let Err(e) = &outcome {
                        let class = if e.is_protocol() { "protocol" } else { "transport" };
                        debug!("Request to {} failed ({} error): {}", endpoint.label, class, e);
                    }
                    collector.record(&outcome);
                }
                Err(e) => {
                    warn!("Request task for {} did not complete: {}", endpoint.label, e);
                    collector.record_lost();
                }
            }
        }
        let elapsed = timer.stop();

        let failures = collector.failures().total();
        if failures > 0 {
            warn!(
                "{}: {}/{} requests succeeded, {} failed ({:?})",
                endpoint.label,
                collector.successful(),
                batch_size,
                failures,
                collector.failures()
            );
        }

        let result = collector.finish(endpoint, elapsed)?;
        info!(
            "Load test complete for {}: {:.2} req/s, avg {:.2}ms, {}ms total",
            endpoint.label,
            result.requests_per_second,
            result.average_latency_ms,
            result.total_elapsed_ms
        );
        Ok(result)
    }

    /// Run one batch per endpoint
    pub async fn run_pair(
        &self,
        endpoints: &EndpointPair<Endpoint>,
        document: &Document,
        batch_size: usize,
        mode: PairMode,
    ) -> EndpointPair<Result<ThroughputResult, BattleError>> {
        match mode {
            PairMode::Concurrent => {
                let (a, b) = tokio::join!(
                    self.run(&endpoints.a, document, batch_size),
                    self.run(&endpoints.b, document, batch_size)
                );
                EndpointPair::new(a, b)
            }
            PairMode::Sequential => {
                let a = self.run(&endpoints.a, document, batch_size).await;
                let b = self.run(&endpoints.b, document, batch_size).await;
                EndpointPair::new(a, b)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmark::test_support::{endpoints, ScriptedProcessor};
    use crate::models::EndpointId;
    use std::time::Duration;

    fn orchestrator(processor: ScriptedProcessor) -> (Arc<ScriptedProcessor>, LoadTestOrchestrator) {
        let processor = Arc::new(processor);
        let orchestrator = LoadTestOrchestrator::new(processor.clone());
        (processor, orchestrator)
    }

    #[tokio::test]
    async fn test_full_batch_success() {
        let (processor, orchestrator) = orchestrator(ScriptedProcessor::new(4.0, 2.0));
        let endpoints = endpoints();

        let result = orchestrator
            .run(&endpoints.a, &Document::from("doc"), 50)
            .await
            .unwrap();

        assert_eq!(processor.calls(), 50);
        assert_eq!(result.endpoint, EndpointId::A);
        assert_eq!(result.successful, 50);
        assert_eq!(result.failed, 0);
        assert_eq!(result.average_latency_ms, 4.0);
        assert!(result.requests_per_second > 0.0);
    }

    #[tokio::test]
    async fn test_partial_failures_degrade_gracefully() {
        let (_, orchestrator) = orchestrator(ScriptedProcessor::new(8.0, 8.0).fail_every(2));
        let endpoints = endpoints();

        let result = orchestrator
            .run(&endpoints.b, &Document::from("doc"), 40)
            .await
            .unwrap();

        assert_eq!(result.batch_size, 40);
        assert_eq!(result.successful, 20);
        assert_eq!(result.failed, 20);
        assert_eq!(result.average_latency_ms, 8.0);
    }

    #[tokio::test]
    async fn test_total_failure_is_reported_as_failure() {
        let (processor, orchestrator) =
            orchestrator(ScriptedProcessor::new(1.0, 1.0).failing(EndpointId::A));
        let endpoints = endpoints();

        let err = orchestrator
            .run(&endpoints.a, &Document::from("doc"), 500)
            .await
            .unwrap_err();

        assert_eq!(processor.calls(), 500);
        assert_eq!(
            err,
            BattleError::AllRequestsFailed {
                endpoint: EndpointId::A,
                attempted: 500
            }
        );
    }

    #[tokio::test]
    async fn test_empty_document_makes_no_calls() {
        let (processor, orchestrator) = orchestrator(ScriptedProcessor::new(1.0, 1.0));
        let endpoints = endpoints();

        let result = orchestrator.run(&endpoints.a, &Document::default(), 10).await;

        tokio_test::assert_err!(&result);
        assert_eq!(result.unwrap_err(), BattleError::EmptyInput);
        assert_eq!(processor.calls(), 0);
    }

    #[tokio::test]
    async fn test_zero_batch_rejected() {
        let (processor, orchestrator) = orchestrator(ScriptedProcessor::new(1.0, 1.0));
        let endpoints = endpoints();

        let err = orchestrator
            .run(&endpoints.a, &Document::from("doc"), 0)
            .await
            .unwrap_err();

        assert_eq!(err, BattleError::InvalidBatchSize);
        assert_eq!(processor.calls(), 0);
    }

    #[tokio::test]
    async fn test_batch_is_dispatched_concurrently() {
        let (processor, orchestrator) = orchestrator(
            ScriptedProcessor::new(1.0, 1.0).with_delay(Duration::from_millis(100)),
        );
        let endpoints = endpoints();

        let result = orchestrator
            .run(&endpoints.a, &Document::from("doc"), 20)
            .await
            .unwrap();

        assert_eq!(processor.max_in_flight(), 20);
        assert!(result.total_elapsed_ms >= 100);
        assert!(result.total_elapsed_ms < 20 * 100);
    }

    #[tokio::test]
    async fn test_run_pair_keeps_results_per_endpoint() {
        let (_, orchestrator) =
            orchestrator(ScriptedProcessor::new(3.0, 1.0).failing(EndpointId::B));

        let pair = orchestrator
            .run_pair(&endpoints(), &Document::from("doc"), 10, PairMode::Concurrent)
            .await;

        let a = tokio_test::assert_ok!(pair.a);
        assert_eq!(a.average_latency_ms, 3.0);
        assert!(matches!(
            pair.b,
            Err(BattleError::AllRequestsFailed {
                endpoint: EndpointId::B,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_run_pair_sequential() {
        let (processor, orchestrator) = orchestrator(ScriptedProcessor::new(2.0, 6.0));

        let pair = orchestrator
            .run_pair(&endpoints(), &Document::from("doc"), 5, PairMode::Sequential)
            .await;

        assert_eq!(processor.calls(), 10);
        assert_eq!(pair.a.unwrap().average_latency_ms, 2.0);
        assert_eq!(pair.b.unwrap().average_latency_ms, 6.0);
    }
}
