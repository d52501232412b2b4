//! Scripted processor used by the benchmark and state tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::http::{CallError, Processor};
use crate::models::{
    Document, Endpoint, EndpointId, EndpointPair, ProcessingResult, ProcessingStatus,
};

/// Replies with a fixed latency per endpoint, optionally failing some calls
pub struct ScriptedProcessor {
    latency: EndpointPair<f64>,
    failing: EndpointPair<bool>,
    fail_every: Option<usize>,
    delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedProcessor {
    pub fn new(latency_a: f64, latency_b: f64) -> Self {
        Self {
            latency: EndpointPair::new(latency_a, latency_b),
            failing: EndpointPair::new(false, false),
            fail_every: None,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Every call to `id` fails with a connection error
    pub fn failing(mut self, id: EndpointId) -> Self {
        *self.failing.get_mut(id) = true;
        self
    }

    /// Every `n`th call (1-based) fails with a 503
    pub fn fail_every(mut self, n: usize) -> Self {
        self.fail_every = Some(n);
        self
    }

    /// Hold every call open for `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Processor for ScriptedProcessor {
    async fn process(
        &self,
        endpoint: &Endpoint,
        document: &Document,
    ) -> Result<ProcessingResult, CallError> {
        let call_number = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if *self.failing.get(endpoint.id) {
            return Err(CallError::Connect(endpoint.process_url()));
        }
        if let Some(n) = self.fail_every {
            if call_number % n == 0 {
                return Err(CallError::Status {
                    status: 503,
                    url: endpoint.process_url(),
                });
            }
        }

        Ok(ProcessingResult {
            endpoint: endpoint.id,
            status: ProcessingStatus::Success,
            complexity_score: "1.00".to_string(),
            document_hash: format!("len-{}", document.len()),
            processed_by: endpoint.label.clone(),
            processing_time_ms: *self.latency.get(endpoint.id),
        })
    }
}

pub fn endpoints() -> EndpointPair<Endpoint> {
    EndpointPair::new(
        Endpoint::new(EndpointId::A, "Endpoint A", "http://localhost:8080"),
        Endpoint::new(EndpointId::B, "Endpoint B", "http://localhost:8081"),
    )
}
