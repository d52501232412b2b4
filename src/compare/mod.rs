//! Endpoint comparison
//!
//! Derives a winner and speedup factor from two results of the same kind.
//! Both functions are pure and independent of argument order.

use crate::models::{
    ComparisonKind, ComparisonOutcome, EndpointId, ProcessingResult, ThroughputResult,
};

/// Endpoint comparator
pub struct Comparator;

impl Comparator {
    /// Lower self-reported processing time wins.
    ///
    /// `None` when either side is missing or both results belong to the
    /// same endpoint.
    pub fn compare_latency(
        first: Option<&ProcessingResult>,
        second: Option<&ProcessingResult>,
    ) -> Option<ComparisonOutcome> {
        let (first, second) = (first?, second?);
        Self::decide(
            ComparisonKind::Latency,
            (first.endpoint, first.processing_time_ms),
            (second.endpoint, second.processing_time_ms),
        )
    }

    /// Higher requests per second wins.
    ///
    /// Requires exactly two results, one per endpoint.
    pub fn compare_throughput(results: &[ThroughputResult]) -> Option<ComparisonOutcome> {
        match results {
            [first, second] => Self::decide(
                ComparisonKind::Throughput,
                (first.endpoint, first.requests_per_second),
                (second.endpoint, second.requests_per_second),
            ),
            _ => None,
        }
    }

    fn decide(
        kind: ComparisonKind,
        first: (EndpointId, f64),
        second: (EndpointId, f64),
    ) -> Option<ComparisonOutcome> {
        if first.0 == second.0 || !first.1.is_finite() || !second.1.is_finite() {
            return None;
        }

        // Endpoint order, not argument order, so ties always go to A
        let (a, b) = if first.0 < second.0 {
            (first, second)
        } else {
            (second, first)
        };

        let b_wins = match kind {
            ComparisonKind::Latency => b.1 < a.1,
            ComparisonKind::Throughput => b.1 > a.1,
        };
        let (winner, loser) = if b_wins { (b, a) } else { (a, b) };

        // better / worse, expressed so the factor is >= 1
        let (better, worse) = match kind {
            ComparisonKind::Latency => (loser.1, winner.1),
            ComparisonKind::Throughput => (winner.1, loser.1),
        };
        let speedup_factor = if better == worse {
            1.0
        } else if worse == 0.0 {
            f64::INFINITY
        } else {
            better / worse
        };

        Some(ComparisonOutcome {
            kind,
            winner: winner.0,
            loser: loser.0,
            speedup_factor,
        })
    }
}
