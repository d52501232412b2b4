//! Result models for endpoint benchmarks
//!
//! Defines single-shot processing results, batch throughput results and
//! comparison verdicts.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::endpoint::EndpointId;
use crate::benchmark::LatencyStats;

/// Status reported by an endpoint
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    Success,
    #[serde(other)]
    Failure,
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessingStatus::Success => write!(f, "success"),
            ProcessingStatus::Failure => write!(f, "failure"),
        }
    }
}

/// Response body returned by `POST /process`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProcessResponse {
    pub status: ProcessingStatus,
    pub complexity_score: String,
    pub document_hash: String,
    pub processed_by: String,
    pub processing_time_ms: f64,
}

/// One completed call against one endpoint
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProcessingResult {
    /// Endpoint the request was sent to
    pub endpoint: EndpointId,
    pub status: ProcessingStatus,
    pub complexity_score: String,
    pub document_hash: String,
    /// Identifier the endpoint reported for itself
    pub processed_by: String,
    /// Self-reported processing duration
    pub processing_time_ms: f64,
}

impl ProcessingResult {
    pub fn from_response(endpoint: EndpointId, response: ProcessResponse) -> Self {
        Self {
            endpoint,
            status: response.status,
            complexity_score: response.complexity_score,
            document_hash: response.document_hash,
            processed_by: response.processed_by,
            processing_time_ms: response.processing_time_ms,
        }
    }
}

/// Aggregate statistics for one completed load-test batch
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThroughputResult {
    pub endpoint: EndpointId,
    pub endpoint_label: String,
    /// `batch_size / total_elapsed_ms * 1000`, two decimals
    pub requests_per_second: f64,
    /// Mean self-reported latency of successful calls, two decimals
    pub average_latency_ms: f64,
    /// Wall clock from first dispatch until every call settled
    pub total_elapsed_ms: u64,
    pub batch_size: usize,
    pub successful: usize,
    pub failed: usize,
    pub latency: LatencyStats,
}

impl ThroughputResult {
    /// Share of the batch that returned a usable result
    pub fn success_rate(&self) -> f64 {
        if self.batch_size == 0 {
            0.0
        } else {
            self.successful as f64 / self.batch_size as f64
        }
    }
}

/// The category a verdict was derived from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonKind {
    /// Lower single-shot processing time wins
    Latency,
    /// Higher requests per second wins
    Throughput,
}

impl fmt::Display for ComparisonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonKind::Latency => write!(f, "latency"),
            ComparisonKind::Throughput => write!(f, "throughput"),
        }
    }
}

/// Winner of a comparison and how far ahead it is
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComparisonOutcome {
    pub kind: ComparisonKind,
    pub winner: EndpointId,
    pub loser: EndpointId,
    /// Always >= 1.0; infinite when the winner's metric is zero
    pub speedup_factor: f64,
}

impl ComparisonOutcome {
    /// Whether both metrics were exactly equal
    pub fn is_tie(&self) -> bool {
        self.speedup_factor == 1.0
    }

    /// Speedup rendered with one decimal, e.g. `3.0x`
    pub fn speedup_display(&self) -> String {
        if self.speedup_factor.is_finite() {
            format!("{:.1}x", self.speedup_factor)
        } else {
            "∞".to_string()
        }
    }
}

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
