//! Batch metrics collection and analysis
//!
//! Provides latency percentiles, failure accounting and the throughput
//! aggregation for a completed load-test batch.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::BattleError;
use crate::http::CallError;
use crate::models::{round_to, Endpoint, ProcessingResult, ThroughputResult};

/// Latency percentiles (p50, p90, p95, p99)
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Percentiles {
    /// 50th percentile (median)
    pub p50: f64,
    /// 90th percentile
    pub p90: f64,
    /// 95th percentile
    pub p95: f64,
    /// 99th percentile
    pub p99: f64,
}

impl Percentiles {
    /// Calculate percentiles from sorted latencies (in milliseconds)
    pub fn from_sorted(latencies: &[f64]) -> Self {
        if latencies.is_empty() {
            return Self::default();
        }

        Self {
            p50: percentile(latencies, 50.0),
            p90: percentile(latencies, 90.0),
            p95: percentile(latencies, 95.0),
            p99: percentile(latencies, 99.0),
        }
    }
}

/// Calculate percentile value from sorted array
fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }

    let idx = (p / 100.0) * (sorted.len() - 1) as f64;
    let lower = idx.floor() as usize;
    let upper = idx.ceil() as usize;
    let fraction = idx - lower as f64;

    if upper >= sorted.len() {
        sorted[sorted.len() - 1]
    } else {
        sorted[lower] * (1.0 - fraction) + sorted[upper] * fraction
    }
}

/// Distribution of self-reported latencies within a batch
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LatencyStats {
    /// Minimum latency in milliseconds
    pub min: f64,
    /// Maximum latency in milliseconds
    pub max: f64,
    /// Mean latency in milliseconds
    pub mean: f64,
    /// Standard deviation in milliseconds
    pub std_dev: f64,
    /// Latency percentiles
    pub percentiles: Percentiles,
    /// Total number of samples
    pub count: usize,
}

impl LatencyStats {
    /// Calculate statistics from latency samples (in milliseconds)
    pub fn from_samples(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }

        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let min = sorted[0];
        let max = sorted[sorted.len() - 1];
        let sum: f64 = sorted.iter().sum();
        let mean = sum / sorted.len() as f64;

        let variance: f64 =
            sorted.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / sorted.len() as f64;

        Self {
            min,
            max,
            mean,
            std_dev: variance.sqrt(),
            percentiles: Percentiles::from_sorted(&sorted),
            count: sorted.len(),
        }
    }

    /// Format as summary string
    pub fn format_summary(&self) -> String {
        format!(
            "min={:.2}ms max={:.2}ms std={:.2}ms p50={:.2}ms p95={:.2}ms p99={:.2}ms",
            self.min,
            self.max,
            self.std_dev,
            self.percentiles.p50,
            self.percentiles.p95,
            self.percentiles.p99
        )
    }
}

/// Failed calls in a batch, by cause
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureStats {
    pub timeouts: usize,
    pub connection_errors: usize,
    pub transport_errors: usize,
    pub bad_status: usize,
    pub malformed_bodies: usize,
    /// Tasks that never reported back
    pub lost: usize,
}

impl FailureStats {
    /// Total failure count
    pub fn total(&self) -> usize {
        self.timeouts
            + self.connection_errors
            + self.transport_errors
            + self.bad_status
            + self.malformed_bodies
            + self.lost
    }

    /// Record a failed call
    pub fn record(&mut self, error: &CallError) {
        match error {
            CallError::Timeout(_) => self.timeouts += 1,
            CallError::Connect(_) => self.connection_errors += 1,
            CallError::Transport(_) => self.transport_errors += 1,
            CallError::Status { .. } => self.bad_status += 1,
            CallError::MalformedBody(_) => self.malformed_bodies += 1,
        }
    }
}

/// Collects per-call outcomes of one batch
#[derive(Debug)]
pub struct BatchCollector {
    batch_size: usize,
    latencies: Vec<f64>,
    failures: FailureStats,
}

impl BatchCollector {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size,
            latencies: Vec::with_capacity(batch_size),
            failures: FailureStats::default(),
        }
    }

    /// Record one settled call
    pub fn record(&mut self, outcome: &Result<ProcessingResult, CallError>) {
        match outcome {
            Ok(result) => self.record_success(result.processing_time_ms),
            Err(e) => self.record_failure(e),
        }
    }

    pub fn record_success(&mut self, processing_time_ms: f64) {
        self.latencies.push(processing_time_ms);
    }

    pub fn record_failure(&mut self, error: &CallError) {
        self.failures.record(error);
    }

    /// Record a call whose task died before reporting
    pub fn record_lost(&mut self) {
        self.failures.lost += 1;
    }

    pub fn successful(&self) -> usize {
        self.latencies.len()
    }

    pub fn failures(&self) -> &FailureStats {
        &self.failures
    }

    /// Aggregate the batch. Fails when no call succeeded.
    pub fn finish(
        self,
        endpoint: &Endpoint,
        elapsed: Duration,
    ) -> Result<ThroughputResult, BattleError> {
        if self.latencies.is_empty() {
            return Err(BattleError::AllRequestsFailed {
                endpoint: endpoint.id,
                attempted: self.batch_size,
            });
        }

        // Sub-microsecond batches would divide by zero
        let elapsed_ms = (elapsed.as_secs_f64() * 1000.0).max(0.001);
        let requests_per_second = (self.batch_size as f64 / elapsed_ms) * 1000.0;
        let latency = LatencyStats::from_samples(&self.latencies);

        Ok(ThroughputResult {
            endpoint: endpoint.id,
            endpoint_label: endpoint.label.clone(),
            requests_per_second: round_to(requests_per_second, 2),
            average_latency_ms: round_to(latency.mean, 2),
            total_elapsed_ms: elapsed_ms.round() as u64,
            batch_size: self.batch_size,
            successful: self.latencies.len(),
            failed: self.failures.total(),
            latency,
        })
    }
}
